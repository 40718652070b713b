use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct PartDoc {
    pub part_type: String,
    /// "Yes" or "No"
    pub replaced: String,
    pub brand_name: String,
    pub supplier: String,
    pub manufacture_date: String,
    pub expiry_date: String,
    pub change_date: String,
    pub cost: f64,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct RecordInputDoc {
    pub driver_name: String,
    pub car_plate: String,
    pub car_model: String,
    pub parts_count: usize,
    pub total_cost: f64,
    pub date: String,
    pub status: String,
    pub parts: Vec<PartDoc>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct RecordDoc {
    pub id: String,
    pub driver_name: String,
    pub car_plate: String,
    pub car_model: String,
    pub parts_count: usize,
    pub total_cost: f64,
    pub date: String,
    pub status: String,
    pub parts: Vec<PartDoc>,
}

#[derive(ToSchema)]
pub struct UserDoc {
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::records::list,
        crate::records::get,
        crate::records::create,
        crate::records::update,
        crate::records::delete,
        crate::users::list,
        crate::users::get,
        crate::users::create,
    ),
    components(schemas(HealthResponse, PartDoc, RecordInputDoc, RecordDoc, UserDoc)),
    tags((name = "health"), (name = "records"), (name = "users"))
)]
pub struct ApiDoc;
