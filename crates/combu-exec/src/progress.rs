use log::info;

/// Receives progress notifications from a [`Progress`] wrapper.
pub trait ProgressSink {
    /// Called once before the first item with the expected item count.
    fn start(&mut self, total: usize);
    /// Called after every yielded item with the number yielded so far.
    fn advance(&mut self, done: usize);
    /// Called once when the wrapped sequence is exhausted.
    fn finish(&mut self);
}

impl<S: ProgressSink + ?Sized> ProgressSink for &mut S {
    fn start(&mut self, total: usize) {
        (**self).start(total)
    }

    fn advance(&mut self, done: usize) {
        (**self).advance(done)
    }

    fn finish(&mut self) {
        (**self).finish()
    }
}

impl<S: ProgressSink + ?Sized> ProgressSink for Box<S> {
    fn start(&mut self, total: usize) {
        (**self).start(total)
    }

    fn advance(&mut self, done: usize) {
        (**self).advance(done)
    }

    fn finish(&mut self) {
        (**self).finish()
    }
}

/// Progress sink writing roughly ten `info!` lines per run.
#[derive(Debug, Clone)]
pub struct LogProgress {
    label: String,
    total: usize,
    step: usize,
}

impl LogProgress {
    /// Creates a sink prefixing its lines with `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            total: 0,
            step: 1,
        }
    }
}

impl ProgressSink for LogProgress {
    fn start(&mut self, total: usize) {
        self.total = total;
        self.step = (total / 10).max(1);
        info!("{}: 0/{}", self.label, total);
    }

    fn advance(&mut self, done: usize) {
        if done % self.step == 0 || done == self.total {
            info!("{}: {}/{}", self.label, done, self.total);
        }
    }

    fn finish(&mut self) {
        info!("{}: done", self.label);
    }
}

/// Iterator adapter reporting to a [`ProgressSink`]; items pass through untouched.
pub struct Progress<I, S> {
    inner: I,
    sink: S,
    done: usize,
    finished: bool,
}

impl<I, S: ProgressSink> Progress<I, S> {
    /// Wraps `inner`, announcing `total` items to `sink`.
    pub fn new(inner: I, total: usize, mut sink: S) -> Self {
        sink.start(total);
        Self {
            inner,
            sink,
            done: 0,
            finished: false,
        }
    }
}

impl<I: Iterator, S: ProgressSink> Iterator for Progress<I, S> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.next() {
            Some(item) => {
                self.done += 1;
                self.sink.advance(self.done);
                Some(item)
            }
            None => {
                if !self.finished {
                    self.finished = true;
                    self.sink.finish();
                }
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl ProgressSink for Recorder {
        fn start(&mut self, total: usize) {
            self.0.push(format!("start {total}"));
        }

        fn advance(&mut self, done: usize) {
            self.0.push(format!("advance {done}"));
        }

        fn finish(&mut self) {
            self.0.push("finish".to_string());
        }
    }

    #[test]
    fn reports_every_item_and_finishes_once() {
        let mut recorder = Recorder::default();
        let items: Vec<_> = Progress::new(0..2, 2, &mut recorder).collect();
        assert_eq!(items, vec![0, 1]);
        assert_eq!(
            recorder.0,
            vec!["start 2", "advance 1", "advance 2", "finish"]
        );
    }

    #[test]
    fn partial_consumption_never_finishes() {
        let mut recorder = Recorder::default();
        let mut progress = Progress::new(0..3, 3, &mut recorder);
        progress.next();
        drop(progress);
        assert_eq!(recorder.0, vec!["start 3", "advance 1"]);
    }
}
