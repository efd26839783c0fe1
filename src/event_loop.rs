use std::io;
use std::time::Duration;

use crossterm::event::Event;

use crate::drivers::InputDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

/// Single-threaded loop that owns the input driver and hands every event to
/// one handler, one at a time and to completion.
///
/// Window-system notifications are not a separate source: the handler drains
/// them from the window system on every call, so they interleave with input
/// in the order both were produced.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    pub fn poll(&mut self) -> io::Result<Option<Event>> {
        if self.driver.poll(self.poll_interval)? {
            Ok(Some(self.driver.read()?))
        } else {
            Ok(None)
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Runs until the handler returns `ControlFlow::Quit`.
    ///
    /// The handler is called with:
    /// - `Some(event)` when an input event occurs.
    /// - `None` once per iteration before polling, which is where the caller
    ///   drains notifications and draws.
    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, Option<Event>) -> io::Result<ControlFlow>,
    {
        loop {
            if let ControlFlow::Quit = handler(&mut self.driver, None)? {
                break;
            }

            if self.driver.poll(self.poll_interval)? {
                // drain bursts (pointer motion, key repeat) before the next tick
                loop {
                    let event = self.driver.read()?;
                    if let ControlFlow::Quit = handler(&mut self.driver, Some(event))? {
                        return Ok(());
                    }
                    if !self.driver.poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::collections::VecDeque;

    struct Scripted(VecDeque<Event>);

    impl InputDriver for Scripted {
        fn poll(&mut self, _timeout: Duration) -> io::Result<bool> {
            Ok(!self.0.is_empty())
        }

        fn read(&mut self) -> io::Result<Event> {
            self.0
                .pop_front()
                .ok_or_else(|| io::Error::other("script exhausted"))
        }
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn run_delivers_burst_in_order_then_ticks() {
        let script = Scripted(VecDeque::from([key('a'), key('b'), key('q')]));
        let mut event_loop = EventLoop::new(script, Duration::from_millis(0));
        let mut seen = Vec::new();
        event_loop
            .run(|_, event| {
                match event {
                    Some(Event::Key(k)) if k.code == KeyCode::Char('q') => {
                        return Ok(ControlFlow::Quit);
                    }
                    Some(Event::Key(k)) => seen.push(format!("{:?}", k.code)),
                    Some(_) => {}
                    None => seen.push("tick".to_string()),
                }
                Ok(ControlFlow::Continue)
            })
            .unwrap();
        assert_eq!(seen, vec!["tick", "Char('a')", "Char('b')"]);
    }

    #[test]
    fn poll_returns_none_when_idle() {
        let mut event_loop = EventLoop::new(Scripted(VecDeque::new()), Duration::from_millis(0));
        assert!(event_loop.poll().unwrap().is_none());
        event_loop.driver().0.push_back(key('x'));
        assert!(event_loop.poll().unwrap().is_some());
    }
}
