use std::sync::Arc;

use tokio::sync::watch;

use crate::routes::Route;

/// Small observable value shared between renderers.
///
/// Cloning yields another handle to the same value. Writes never fail, even
/// with no subscribers.
#[derive(Debug)]
pub struct Store<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T> Store<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T: Clone> Store<T> {
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }
}

impl<T: Default> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Header presentation: transparent over the hero, or an opaque bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeaderMode {
    #[default]
    Overlay,
    Solid,
}

impl HeaderMode {
    pub fn for_route(route: &Route) -> Self {
        match route {
            Route::Home => Self::Overlay,
            _ => Self::Solid,
        }
    }

    pub fn as_class(self) -> &'static str {
        match self {
            Self::Overlay => "header--overlay",
            Self::Solid => "header--solid",
        }
    }
}

/// Holds a header mode for as long as the page that set it is alive.
#[derive(Debug)]
#[must_use = "the header mode reverts to overlay when the guard is dropped"]
pub struct HeaderModeGuard {
    store: Store<HeaderMode>,
}

impl Drop for HeaderModeGuard {
    fn drop(&mut self) {
        self.store.set(HeaderMode::Overlay);
    }
}

pub fn scoped_header_mode(store: &Store<HeaderMode>, mode: HeaderMode) -> HeaderModeGuard {
    store.set(mode);
    HeaderModeGuard {
        store: store.clone(),
    }
}

/// Open/closed state of the main navigation, shared by the header toggle and
/// the floating menu button.
pub type MenuOpen = Store<bool>;

pub fn toggle_menu(menu: &MenuOpen) {
    menu.update(|open| *open = !*open);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_value() {
        let a = Store::new(1);
        let b = a.clone();
        b.set(2);
        assert_eq!(a.get(), 2);
        a.update(|v| *v += 3);
        assert_eq!(b.get(), 5);
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let store = Store::new(HeaderMode::Overlay);
        let mut rx = store.subscribe();
        store.set(HeaderMode::Solid);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), HeaderMode::Solid);
    }

    #[test]
    fn header_mode_follows_route_and_reverts_on_drop() {
        let store = Store::<HeaderMode>::default();
        assert_eq!(HeaderMode::for_route(&Route::Home), HeaderMode::Overlay);
        assert_eq!(HeaderMode::for_route(&Route::AgendaList), HeaderMode::Solid);

        let guard = scoped_header_mode(&store, HeaderMode::for_route(&Route::AgendaList));
        assert_eq!(store.get(), HeaderMode::Solid);
        drop(guard);
        assert_eq!(store.get(), HeaderMode::Overlay);
    }

    #[test]
    fn menu_toggle_flips_shared_flag() {
        let menu = MenuOpen::default();
        let button_view = menu.clone();
        toggle_menu(&menu);
        assert!(button_view.get());
        toggle_menu(&button_view);
        assert!(!menu.get());
    }
}
