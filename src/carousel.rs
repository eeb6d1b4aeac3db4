use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

#[derive(Debug)]
pub struct Carousel {
    current: AtomicUsize,
    slides: usize,
}

impl Carousel {
    pub fn new(slides: usize) -> Self {
        Self {
            current: AtomicUsize::new(0),
            slides: slides.max(1),
        }
    }

    pub fn current(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }

    pub fn next(&self) -> usize {
        self.step(1)
    }

    pub fn prev(&self) -> usize {
        self.step(self.slides - 1)
    }

    fn step(&self, by: usize) -> usize {
        let slides = self.slides;
        let previous = self
            .current
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |index| {
                Some((index + by) % slides)
            })
            .unwrap_or_else(|index| index);
        (previous + by) % slides
    }

    pub fn spawn_rotation(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let carousel = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                carousel.next();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_in_both_directions() {
        let carousel = Carousel::new(3);
        assert_eq!(carousel.prev(), 2);
        assert_eq!(carousel.next(), 0);
        assert_eq!(carousel.next(), 1);
        assert_eq!(carousel.next(), 2);
        assert_eq!(carousel.next(), 0);
        assert_eq!(carousel.current(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rotation_advances_on_each_period() {
        let carousel = Arc::new(Carousel::new(4));
        let handle = carousel.spawn_rotation(Duration::from_secs(5));

        tokio::time::sleep(Duration::from_millis(10_500)).await;
        assert_eq!(carousel.current(), 2);

        handle.abort();
    }
}
