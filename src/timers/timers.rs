use std::collections::HashMap;
use std::io::Write;
use std::ops::{Deref, DerefMut};
use std::time::Duration;

#[cfg(not(target_family = "wasm"))]
use std::time::Instant;
#[cfg(target_family = "wasm")]
use web_time::Instant;

#[derive(Debug, Default)]
struct InnerTimer {
    start: Option<Instant>,
    elapsed: Duration,
    subtimers: SubTimersMap,
}

impl InnerTimer {
    fn reset(&mut self) {
        self.start = None;
        self.elapsed = Duration::ZERO;
        self.subtimers.clear();
    }

    fn start(&mut self) {
        self.start = Some(Instant::now());
    }

    fn stop(&mut self) {
        if let Some(instant) = self.start.take() {
            self.elapsed += instant.elapsed();
        }
    }

    fn suspend(&mut self) {
        //bank the current elapsed time and suspend
        //subtimers if this timer appears active
        if let Some(instant) = self.start {
            self.elapsed += instant.elapsed();
            self.subtimers.suspend();
        }
    }

    fn resume(&mut self) {
        //refresh the start time if this timer appears active
        if self.start.is_some() {
            self.start = Some(Instant::now());
            self.subtimers.resume();
        }
    }
}

#[derive(Debug, Default)]
struct SubTimersMap(HashMap<&'static str, InnerTimer>);

impl Deref for SubTimersMap {
    type Target = HashMap<&'static str, InnerTimer>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl DerefMut for SubTimersMap {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl SubTimersMap {
    fn reset_subtimer(&mut self, key: &'static str) {
        self.entry(key).or_default().reset();
    }

    fn start_subtimer(&mut self, key: &'static str) {
        self.entry(key).or_default().start();
    }

    //this function suspends every timer in the
    //collection.   Used for notimeit!
    fn suspend(&mut self) {
        for t in self.values_mut() {
            t.suspend();
        }
    }

    fn resume(&mut self) {
        for t in self.values_mut() {
            t.resume();
        }
    }

    fn total_time(&self) -> Duration {
        self.values().fold(Duration::ZERO, |acc, t| acc + t.elapsed)
    }

    fn print(&self, out: &mut dyn Write, depth: usize) -> std::io::Result<()> {
        // sorted for stable output
        let mut keys: Vec<_> = self.keys().collect();
        keys.sort();
        for key in keys {
            let t = &self[key];
            let tabs = format!("{: <1$}", "", 4 * depth);
            writeln!(out, "{}{:} : {:?}", tabs, key, t.elapsed)?;
            t.subtimers.print(out, depth + 1)?;
        }
        Ok(())
    }
}

/// Hierarchical wall clock timers, keyed by name
#[derive(Default, Debug)]
pub struct Timers {
    stack: Vec<&'static str>,
    subtimers: SubTimersMap,
}

impl Timers {
    fn mut_active_timer(&mut self) -> Option<&mut InnerTimer> {
        let (first, rest) = self.stack.split_first()?;
        let mut active_timer = self.subtimers.get_mut(first)?;
        for key in rest {
            active_timer = active_timer.subtimers.get_mut(key)?;
        }
        Some(active_timer)
    }

    pub fn reset_timer(&mut self, key: &'static str) {
        self.subtimers.reset_subtimer(key);
    }

    pub fn start_as_current(&mut self, key: &'static str) {
        //starts a timer with name "key" as the current timer
        match self.mut_active_timer() {
            // child of current active timer
            Some(active) => active.subtimers.start_subtimer(key),
            // nothing active, create one at root
            None => self.subtimers.start_subtimer(key),
        }
        self.stack.push(key);
    }

    pub fn stop_current(&mut self) {
        if let Some(active) = self.mut_active_timer() {
            active.stop();
        }
        self.stack.pop();
    }

    //Suspend every timer in the collection.   Used for notimeit!
    pub fn suspend(&mut self) {
        self.subtimers.suspend();
    }

    //Resume every timer in the collection.   Used for notimeit!
    pub fn resume(&mut self) {
        self.subtimers.resume();
    }

    pub fn total_time(&self) -> Duration {
        self.subtimers.total_time()
    }

    /// Elapsed time of a top level timer, zero if it never ran
    pub fn elapsed(&self, key: &'static str) -> Duration {
        self.subtimers
            .get(key)
            .map_or(Duration::ZERO, |t| t.elapsed)
    }

    pub fn print(&self, out: &mut dyn Write) -> std::io::Result<()> {
        self.subtimers.print(out, 0)
    }
}

macro_rules! timeit {
    ($timer:ident => $key:literal; $($tt:tt)+) => {

        $timer.start_as_current($key);
        $(
            $tt
        )+
        $timer.stop_current();
    }
}
pub(crate) use timeit;

macro_rules! notimeit {
    ($timer:ident; $($tt:tt)+) => {

        $timer.suspend();
        $(
            $tt
        )+
        $timer.resume();
    }
}
pub(crate) use notimeit;

#[test]
fn test_timers_nesting() {
    let mut timers = Timers::default();
    timeit! {timers => "solve"; {
        timeit! {timers => "inner"; {
            std::thread::sleep(Duration::from_millis(2));
        }}
        notimeit! {timers; {
            std::thread::sleep(Duration::from_millis(2));
        }}
    }}
    assert!(timers.elapsed("solve") >= Duration::from_millis(2));
    assert_eq!(timers.elapsed("setup"), Duration::ZERO);
    assert_eq!(timers.total_time(), timers.elapsed("solve"));

    let mut out = Vec::new();
    timers.print(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("solve : "));
    assert!(text.contains("    inner : "));

    timers.reset_timer("solve");
    assert_eq!(timers.elapsed("solve"), Duration::ZERO);
}
