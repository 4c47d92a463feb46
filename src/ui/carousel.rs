use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::cms::hero::HeroItem;

/// Minimum horizontal drag, in pixels, that counts as a swipe.
pub const SWIPE_THRESHOLD: f64 = 40.0;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// Identifies one load; only the most recent ticket may publish its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Hero carousel state: ordered slides and the one currently shown.
#[derive(Debug, Clone, Default)]
pub struct Carousel {
    items: Vec<HeroItem>,
    index: usize,
    autoplay: bool,
    drag_start_x: Option<f64>,
    status: LoadStatus,
    generation: u64,
}

impl Carousel {
    pub fn new(items: Vec<HeroItem>, autoplay: bool) -> Self {
        Self {
            items,
            autoplay,
            status: LoadStatus::Ready,
            ..Self::default()
        }
    }

    pub fn items(&self) -> &[HeroItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&HeroItem> {
        self.items.get(self.index)
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn set_autoplay(&mut self, autoplay: bool) {
        self.autoplay = autoplay;
    }

    /// Moves `delta` slides, wrapping in both directions.
    pub fn go(&mut self, delta: isize) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
        {
            self.index = (self.index as isize + delta).rem_euclid(len as isize) as usize;
        }
    }

    pub fn advance(&mut self) {
        self.go(1);
    }

    /// Jumps to slide `index` (pagination dots); out-of-range indexes are ignored.
    pub fn select(&mut self, index: usize) {
        if index < self.items.len() {
            self.index = index;
        }
    }

    /// How long the current slide stays up before autoplay advances.
    pub fn autoplay_delay(&self) -> Option<Duration> {
        if !self.autoplay || self.items.len() < 2 {
            return None;
        }
        self.current().map(HeroItem::duration)
    }

    pub fn pointer_down(&mut self, x: f64) {
        self.drag_start_x = Some(x);
    }

    /// Ends a drag. Leftward swipes show the next slide, rightward the
    /// previous. Returns whether the slide changed.
    pub fn pointer_up(&mut self, x: f64) -> bool {
        let Some(start) = self.drag_start_x.take() else {
            return false;
        };
        let dx = x - start;
        if dx.abs() <= SWIPE_THRESHOLD {
            return false;
        }
        self.go(if dx < 0.0 { 1 } else { -1 });
        true
    }

    pub fn pointer_cancel(&mut self) {
        self.drag_start_x = None;
    }

    pub fn set_items(&mut self, items: Vec<HeroItem>) {
        self.items = items;
        if self.index >= self.items.len() {
            self.index = 0;
        }
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.status = LoadStatus::Loading;
        LoadTicket(self.generation)
    }

    /// Publishes a load result unless a newer load started or the carousel
    /// was torn down in the meantime. Returns whether the result was applied.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<HeroItem>, String>,
    ) -> bool {
        if ticket.0 != self.generation {
            tracing::debug!(
                ticket = ticket.0,
                current = self.generation,
                "discarding stale hero load"
            );
            return false;
        }
        match result {
            Ok(items) => {
                self.set_items(items);
                self.status = LoadStatus::Ready;
            }
            Err(message) => self.status = LoadStatus::Failed(message),
        }
        true
    }

    /// Invalidates any outstanding load.
    pub fn teardown(&mut self) {
        self.generation += 1;
    }
}

/// A carousel shared with its autoplay task.
///
/// Every mutation made through [`SharedCarousel::update`] bumps a revision,
/// which reschedules the pending autoplay step.
#[derive(Debug, Clone)]
pub struct SharedCarousel {
    state: Arc<Mutex<Carousel>>,
    revision: Arc<watch::Sender<u64>>,
}

impl SharedCarousel {
    pub fn new(carousel: Carousel) -> Self {
        let (revision, _rx) = watch::channel(0);
        Self {
            state: Arc::new(Mutex::new(carousel)),
            revision: Arc::new(revision),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Carousel> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Carousel {
        self.lock().clone()
    }

    pub fn index(&self) -> usize {
        self.lock().index()
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut Carousel) -> R) -> R {
        let out = {
            let mut guard = self.lock();
            f(&mut *guard)
        };
        self.revision.send_modify(|r| *r += 1);
        out
    }

    /// Spawns the autoplay loop. It runs until the returned guard is dropped.
    pub fn start_autoplay(&self) -> Autoplay {
        let shared = self.clone();
        let mut changes = self.revision.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                changes.mark_unchanged();
                let delay = shared.lock().autoplay_delay();
                match delay {
                    Some(delay) => {
                        tokio::select! {
                            () = tokio::time::sleep(delay) => shared.update(Carousel::advance),
                            changed = changes.changed() => {
                                if changed.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    None => {
                        if changes.changed().await.is_err() {
                            break;
                        }
                    }
                }
            }
        });
        Autoplay { handle }
    }
}

/// Scope of a running autoplay loop; dropping it stops the timer.
#[derive(Debug)]
#[must_use = "autoplay stops when the guard is dropped"]
pub struct Autoplay {
    handle: JoinHandle<()>,
}

impl Drop for Autoplay {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slides(durations_ms: &[f64]) -> Vec<HeroItem> {
        durations_ms
            .iter()
            .enumerate()
            .map(|(i, ms)| {
                let mut item = HeroItem::new(i.to_string(), format!("Slide {i}"));
                item.duration_ms = Some(*ms);
                item
            })
            .collect()
    }

    #[test]
    fn go_wraps_in_both_directions() {
        let mut c = Carousel::new(slides(&[1000.0; 3]), true);
        c.go(-1);
        assert_eq!(c.index(), 2);
        c.go(1);
        assert_eq!(c.index(), 0);
        c.go(7);
        assert_eq!(c.index(), 1);
        c.go(1);
        c.go(-1);
        assert_eq!(c.index(), 1);

        let mut empty = Carousel::new(Vec::new(), true);
        empty.go(3);
        assert_eq!(empty.index(), 0);
        assert!(empty.current().is_none());
    }

    #[test]
    fn drags_beyond_threshold_change_slide() {
        let mut c = Carousel::new(slides(&[1000.0; 3]), false);

        c.pointer_down(200.0);
        assert!(!c.pointer_up(160.0));
        assert_eq!(c.index(), 0);

        c.pointer_down(200.0);
        assert!(c.pointer_up(150.0));
        assert_eq!(c.index(), 1);

        c.pointer_down(100.0);
        assert!(c.pointer_up(141.0));
        assert_eq!(c.index(), 0);

        assert!(!c.pointer_up(0.0));
        c.pointer_down(0.0);
        c.pointer_cancel();
        assert!(!c.pointer_up(500.0));
    }

    #[test]
    fn autoplay_needs_two_slides() {
        assert_eq!(Carousel::new(slides(&[3000.0]), true).autoplay_delay(), None);
        assert_eq!(Carousel::new(slides(&[3000.0, 2.0]), false).autoplay_delay(), None);
        assert_eq!(
            Carousel::new(slides(&[3000.0, 2.0]), true).autoplay_delay(),
            Some(Duration::from_secs(3))
        );
    }

    #[test]
    fn stale_loads_are_discarded() {
        let mut c = Carousel::default();
        let first = c.begin_load();
        let second = c.begin_load();
        assert_eq!(c.status(), &LoadStatus::Loading);

        assert!(!c.finish_load(first, Ok(slides(&[1000.0]))));
        assert!(c.is_empty());

        assert!(c.finish_load(second, Err("CMS error 500: boom".to_owned())));
        assert_eq!(c.status(), &LoadStatus::Failed("CMS error 500: boom".to_owned()));

        let third = c.begin_load();
        c.teardown();
        assert!(!c.finish_load(third, Ok(slides(&[1000.0]))));
    }

    #[test]
    fn replacing_items_keeps_index_in_range() {
        let mut c = Carousel::new(slides(&[1000.0; 4]), true);
        c.select(3);
        c.set_items(slides(&[1000.0; 2]));
        assert_eq!(c.index(), 0);
        c.select(5);
        assert_eq!(c.index(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn autoplay_follows_each_slide_duration() {
        let shared = SharedCarousel::new(Carousel::new(slides(&[1000.0, 2000.0, 3000.0]), true));
        let autoplay = shared.start_autoplay();

        tokio::time::sleep(Duration::from_millis(1_001)).await;
        assert_eq!(shared.index(), 1);

        tokio::time::sleep(Duration::from_millis(2_499)).await;
        assert_eq!(shared.index(), 2);

        // Manual navigation at t=3.5s restarts the timer for slide 1 (2s).
        shared.update(|c| c.go(-1));
        tokio::time::sleep(Duration::from_millis(1_900)).await;
        assert_eq!(shared.index(), 1);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(shared.index(), 2);

        drop(autoplay);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(shared.index(), 2);
    }
}
