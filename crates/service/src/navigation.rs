//! Sidebar menu: ordering, drag-and-drop placement and open/collapsed state.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::session::{keys, SessionContext, SessionError, SessionEvent};

/// Below this viewport width the sidebar is an overlay and closes on navigation.
pub const NARROW_VIEWPORT: u32 = 1024;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub path: String,
    pub label: String,
    pub icon: String,
    pub completed: bool,
    pub description: String,
}

fn item(path: &str, label: &str, icon: &str, completed: bool, description: &str) -> MenuItem {
    MenuItem {
        path: path.into(),
        label: label.into(),
        icon: icon.into(),
        completed,
        description: description.into(),
    }
}

pub fn default_menu() -> Vec<MenuItem> {
    vec![
        item("/", "Dashboard", "📊", true, "Overview and analytics"),
        item("/add-record", "Add Record", "➕", false, "Create new maintenance record"),
        item("/view-records", "View Records", "📋", true, "Browse all records"),
    ]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropPosition {
    Above,
    Below,
}

/// Index the dragged item ends up at when dropped on `target`.
pub fn drop_index(dragged: usize, target: usize, position: DropPosition, len: usize) -> usize {
    let idx = match position {
        DropPosition::Below if dragged > target => target + 1,
        DropPosition::Above if dragged < target => target.saturating_sub(1),
        _ => target,
    };
    idx.min(len.saturating_sub(1))
}

/// Move `items[from]` to index `to` (clamped). Out-of-range `from` is a no-op.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from >= items.len() {
        return;
    }
    let it = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, it);
}

/// Sidebar state kept in the session.
pub struct Sidebar {
    session: SessionContext,
    pub open: bool,
    pub collapsed: bool,
    pub items: Vec<MenuItem>,
}

impl Sidebar {
    pub async fn load(session: SessionContext) -> Result<Self, SessionError> {
        let open = session.sidebar_open().await?;
        let collapsed = session.sidebar_collapsed().await?;
        let items = session
            .get_json::<Vec<MenuItem>>(keys::SIDEBAR_MENU_ITEMS)
            .await?
            .unwrap_or_else(default_menu);
        Ok(Self { session, open, collapsed, items })
    }

    pub async fn save(&self) -> Result<(), SessionError> {
        self.session.set_sidebar_open(self.open).await?;
        self.session.set_sidebar_collapsed(self.collapsed).await?;
        self.session.set_json(keys::SIDEBAR_MENU_ITEMS, &self.items).await
    }

    pub async fn set_open(&mut self, open: bool) -> Result<(), SessionError> {
        self.open = open;
        self.session.set_sidebar_open(open).await
    }

    pub async fn toggle_collapsed(&mut self) -> Result<(), SessionError> {
        self.collapsed = !self.collapsed;
        self.session.set_sidebar_collapsed(self.collapsed).await
    }

    /// Ask every sidebar following this session to open.
    pub fn request_open(&self) { self.session.publish(SessionEvent::OpenSidebar); }

    /// Apply a pending open request, if one is in `event`.
    pub async fn on_event(&mut self, event: &SessionEvent) -> Result<(), SessionError> {
        if matches!(event, SessionEvent::OpenSidebar) {
            self.set_open(true).await?;
        }
        Ok(())
    }

    pub async fn on_navigate(&mut self, viewport_width: u32) -> Result<(), SessionError> {
        if viewport_width < NARROW_VIEWPORT && self.open {
            self.set_open(false).await?;
        }
        Ok(())
    }

    fn position(&self, path: &str) -> Option<usize> { self.items.iter().position(|i| i.path == path) }

    /// Drop the item at `dragged_path` above or below `target_path`.
    /// Returns false (and changes nothing) when either path is unknown or they are the same.
    pub async fn drop_on(
        &mut self,
        dragged_path: &str,
        target_path: &str,
        position: DropPosition,
    ) -> Result<bool, SessionError> {
        if dragged_path == target_path {
            return Ok(false);
        }
        let (Some(from), Some(target)) = (self.position(dragged_path), self.position(target_path)) else {
            return Ok(false);
        };
        let to = drop_index(from, target, position, self.items.len());
        move_item(&mut self.items, from, to);
        debug!(from, to, "menu item moved");
        self.session.set_json(keys::SIDEBAR_MENU_ITEMS, &self.items).await?;
        Ok(true)
    }

    pub async fn move_item(&mut self, from: usize, to: usize) -> Result<(), SessionError> {
        move_item(&mut self.items, from, to);
        self.session.set_json(keys::SIDEBAR_MENU_ITEMS, &self.items).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[MenuItem]) -> Vec<&str> { items.iter().map(|i| i.label.as_str()).collect() }

    #[test]
    fn move_item_clamps() {
        let mut v = vec![1, 2, 3];
        move_item(&mut v, 0, 2);
        assert_eq!(v, vec![2, 3, 1]);
        move_item(&mut v, 2, 99);
        assert_eq!(v, vec![2, 3, 1]);
        move_item(&mut v, 5, 0);
        assert_eq!(v, vec![2, 3, 1]);
    }

    #[test]
    fn drop_rule() {
        assert_eq!(drop_index(0, 2, DropPosition::Below, 3), 2);
        assert_eq!(drop_index(2, 0, DropPosition::Below, 3), 1);
        assert_eq!(drop_index(2, 0, DropPosition::Above, 3), 0);
        assert_eq!(drop_index(0, 2, DropPosition::Above, 3), 1);
    }

    #[tokio::test]
    async fn drag_reorders_and_persists() {
        let ctx = SessionContext::in_memory();
        let mut bar = Sidebar::load(ctx.clone()).await.unwrap();
        assert_eq!(labels(&bar.items), vec!["Dashboard", "Add Record", "View Records"]);

        assert!(bar.drop_on("/view-records", "/", DropPosition::Above).await.unwrap());
        assert_eq!(labels(&bar.items), vec!["View Records", "Dashboard", "Add Record"]);
        assert!(!bar.drop_on("/x", "/", DropPosition::Above).await.unwrap());

        let reloaded = Sidebar::load(ctx).await.unwrap();
        assert_eq!(reloaded.items, bar.items);
    }

    #[tokio::test]
    async fn open_state_follows_events_and_viewport() {
        let ctx = SessionContext::in_memory();
        let mut rx = ctx.subscribe();
        let mut bar = Sidebar::load(ctx.clone()).await.unwrap();
        assert!(!bar.open);

        bar.request_open();
        let ev = rx.recv().await.unwrap();
        bar.on_event(&ev).await.unwrap();
        assert!(bar.open);

        bar.on_navigate(1280).await.unwrap();
        assert!(bar.open);
        bar.on_navigate(800).await.unwrap();
        assert!(!bar.open);

        bar.toggle_collapsed().await.unwrap();
        assert!(Sidebar::load(ctx).await.unwrap().collapsed);
    }
}
