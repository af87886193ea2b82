use std::sync::{ Mutex, MutexGuard };
use std::sync::atomic::{ AtomicUsize, Ordering };
use std::sync::mpsc;
use std::thread;
use std::time::{ Duration, Instant };

use log::{ info, warn };
use rayon::prelude::*;

use crate::color::Color;
use crate::consts::SPARE_THREADS;
use crate::error::{ Result, TracerError };

/// How pixels are spread over threads.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Threading {
    /// Every pixel on the calling thread, row by row.
    Sequential,

    /// Pixels spread over rayon's global thread pool.
    DataParallel,

    /// A fixed number of worker threads pulling pixels from a shared cursor.
    Workers(usize),
}

impl Default for Threading {
    fn default() -> Threading {
        Threading::Sequential
    }
}

impl Threading {
    /// Resolves a thread count setting.
    ///
    /// `0` renders sequentially, `-1` uses data parallelism, `-2` picks a
    /// worker count from the available cores (leaving a couple free), and
    /// any positive number asks for exactly that many workers.
    pub fn from_count(count: i32) -> Result<Threading> {
        match count {
            0 => Ok(Threading::Sequential),
            -1 => Ok(Threading::DataParallel),
            -2 => Ok(Threading::Workers(auto_workers())),
            n if n > 0 => Ok(Threading::Workers(n as usize)),
            n => Err(TracerError::camera(
                "threads",
                format!("{} is not a thread count (use -2, -1, 0 or more)", n)
            )),
        }
    }
}

fn auto_workers() -> usize {
    let cores = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);

    cores.saturating_sub(SPARE_THREADS).max(1)
}

struct CursorState {
    next: usize,
    last_print: Instant,
}

/// Hands out every pixel of an image exactly once, across threads.
///
/// Also counts finished pixels, logging progress at most once every
/// `interval` when one is set.
pub struct PixelCursor {
    nx: usize,
    total: usize,
    state: Mutex<CursorState>,
    done: AtomicUsize,
    interval: Option<Duration>,
}

impl PixelCursor {
    pub fn new(nx: usize, ny: usize, interval: Option<Duration>) -> PixelCursor {
        PixelCursor {
            nx,
            total: nx * ny,
            state: Mutex::new(CursorState { next: 0, last_print: Instant::now() }),
            done: AtomicUsize::new(0),
            interval,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CursorState> {
        // A worker panicking mid-pixel leaves the cursor itself consistent.
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("pixel cursor lock was poisoned; continuing");
            poisoned.into_inner()
        })
    }

    /// The next unassigned pixel as `(column, row)`, or `None` when every
    /// pixel has been handed out.
    pub fn next_pixel(&self) -> Option<(usize, usize)> {
        let mut state = self.lock();
        if state.next >= self.total {
            return None;
        }

        let index = state.next;
        state.next += 1;
        Some((index % self.nx, index / self.nx))
    }

    /// Marks one pixel finished.
    pub fn pixel_done(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;

        let interval = match self.interval {
            Some(interval) => interval,
            None => return,
        };

        let mut state = self.lock();
        if state.last_print.elapsed() >= interval || done == self.total {
            state.last_print = Instant::now();
            info!("rendered {:.1}% ({}/{} pixels)",
                  100.0 * done as f64 / self.total as f64, done, self.total);
        }
    }

    pub fn done(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }
}

/// Computes every pixel of an `nx × ny` image and hands each color to `write`.
///
/// `pixel` is called once per `(column, row)` and may run on any thread;
/// `write` always runs on the calling thread, once per pixel. Returns after
/// every pixel has been written and every worker has been joined.
pub fn render_pixels<P, W>(threading: Threading, nx: usize, ny: usize,
    progress: Option<Duration>, pixel: P, mut write: W)
where
    P: Fn(usize, usize) -> Color + Sync,
    W: FnMut(usize, usize, Color),
{
    let cursor = PixelCursor::new(nx, ny, progress);

    match threading {
        Threading::Sequential => {
            for row in 0..ny {
                for col in 0..nx {
                    write(col, row, pixel(col, row));
                    cursor.pixel_done();
                }
            }
        },

        Threading::DataParallel => {
            let colors: Vec<Color> = (0..nx * ny).into_par_iter()
                .map(|i| {
                    let color = pixel(i % nx, i / nx);
                    cursor.pixel_done();
                    color
                })
                .collect();

            for (i, color) in colors.into_iter().enumerate() {
                write(i % nx, i / nx, color);
            }
        },

        Threading::Workers(count) => {
            let (sender, receiver) = mpsc::channel();

            thread::scope(|scope| {
                for _ in 0..count.max(1) {
                    let sender = sender.clone();
                    let cursor = &cursor;
                    let pixel = &pixel;

                    scope.spawn(move || {
                        while let Some((col, row)) = cursor.next_pixel() {
                            let color = pixel(col, row);
                            if sender.send((col, row, color)).is_err() {
                                break;
                            }
                            cursor.pixel_done();
                        }
                    });
                }

                // Only the workers hold senders now; the loop below ends
                // once they all finish.
                drop(sender);
                for (col, row, color) in receiver {
                    write(col, row, color);
                }
            });
        },
    }
}

#[test]
fn thread_counts_resolve() {
    assert_eq!(Threading::from_count(0).unwrap(), Threading::Sequential);
    assert_eq!(Threading::from_count(-1).unwrap(), Threading::DataParallel);
    assert_eq!(Threading::from_count(4).unwrap(), Threading::Workers(4));
    assert!(matches!(Threading::from_count(-2).unwrap(), Threading::Workers(n) if n >= 1));
    assert!(Threading::from_count(-3).is_err());
}

#[test]
fn cursor_hands_out_every_pixel_once() {
    let cursor = PixelCursor::new(3, 2, None);
    let mut seen = Vec::new();

    while let Some(p) = cursor.next_pixel() {
        seen.push(p);
    }

    assert_eq!(seen, vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
    assert_eq!(cursor.next_pixel(), None);
}

#[test]
fn cursor_is_shared_safely() {
    use std::collections::HashSet;

    let cursor = PixelCursor::new(37, 23, None);
    let seen = Mutex::new(HashSet::new());

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                while let Some(p) = cursor.next_pixel() {
                    assert!(seen.lock().unwrap().insert(p));
                    cursor.pixel_done();
                }
            });
        }
    });

    assert_eq!(seen.lock().unwrap().len(), 37 * 23);
    assert_eq!(cursor.done(), 37 * 23);
}

#[test]
fn every_strategy_writes_every_pixel() {
    let strategies = vec![
        Threading::Sequential,
        Threading::DataParallel,
        Threading::Workers(3),
    ];

    for threading in strategies {
        let mut written = vec![None; 5 * 4];
        render_pixels(threading, 5, 4, Some(Duration::from_secs(0)),
            |x, y| Color::rgb(x as f64, y as f64, 0.0),
            |x, y, c| written[y * 5 + x] = Some(c));

        for (i, c) in written.iter().enumerate() {
            assert_eq!(*c, Some(Color::rgb((i % 5) as f64, (i / 5) as f64, 0.0)));
        }
    }
}
