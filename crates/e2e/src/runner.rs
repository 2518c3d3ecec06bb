//! Runs the registered specs concurrently against one [`TestContext`].
//!
//! Each spec gets its own task and deadline; a spec that panics or hangs is
//! reported under its own name rather than taking the run down with it.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::{Id, JoinSet};

use crate::client::TestContext;
use crate::specs;

/// Which registry a spec came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Holds against any endpoint carrying the payroll schema.
    Common,
    /// Relies on the mock's canned actions or seeded rows.
    MockOnly,
}

#[derive(Debug)]
pub struct Outcome {
    /// Spec module: `notes`, `subscriptions`, `federation`, `actions`.
    pub area: &'static str,
    pub name: &'static str,
    pub tier: Tier,
    pub duration: Duration,
    pub error: Option<String>,
}

impl Outcome {
    pub fn passed(&self) -> bool {
        self.error.is_none()
    }

    /// `area::name`, the form used by filters and the registries.
    pub fn path(&self) -> String {
        format!("{}::{}", self.area, self.name)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub passed: usize,
    pub failed: usize,
}

#[derive(Debug)]
pub struct Report {
    /// Sorted by path.
    pub outcomes: Vec<Outcome>,
}

impl Report {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    pub fn by_area(&self) -> BTreeMap<&'static str, Tally> {
        let mut areas: BTreeMap<&'static str, Tally> = BTreeMap::new();
        for outcome in &self.outcomes {
            let tally = areas.entry(outcome.area).or_default();
            if outcome.passed() {
                tally.passed += 1;
            } else {
                tally.failed += 1;
            }
        }
        areas
    }

    pub fn tier(&self, tier: Tier) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(move |o| o.tier == tier)
    }

    /// `area::name: error` for every failed spec.
    pub fn failures(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter_map(|o| o.error.as_ref().map(|e| format!("{}: {e}", o.path())))
            .collect()
    }
}

impl fmt::Display for Report {
    /// `notes 14/14, subscriptions 2/3`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (area, tally) in self.by_area() {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{area} {}/{}", tally.passed, tally.passed + tally.failed)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions<'a> {
    /// Substring matched against `area::name`.
    pub filter: Option<&'a str>,
    pub include_mock_only: bool,
    pub spec_timeout: Duration,
}

impl Default for RunOptions<'_> {
    fn default() -> Self {
        Self {
            filter: None,
            include_mock_only: false,
            spec_timeout: Duration::from_secs(60),
        }
    }
}

type Finished = (Duration, Option<String>);

pub async fn run_all(ctx: Arc<TestContext>, options: RunOptions<'_>) -> Report {
    let mut set: JoinSet<Finished> = JoinSet::new();
    let mut queued: HashMap<Id, (&'static str, &'static str, Tier)> = HashMap::new();
    let limit = options.spec_timeout;

    macro_rules! queue {
        ($tier:expr, $module:ident :: $name:ident) => {{
            let area = stringify!($module);
            let name = stringify!($name);
            if options
                .filter
                .is_none_or(|f| format!("{area}::{name}").contains(f))
            {
                let ctx = ctx.clone();
                let handle = set.spawn(async move {
                    let started = Instant::now();
                    let error = match tokio::time::timeout(limit, specs::$module::$name(&ctx)).await
                    {
                        Ok(Ok(())) => None,
                        Ok(Err(e)) => Some(format!("{e:#}")),
                        Err(_) => Some(format!("timed out after {limit:?}")),
                    };
                    (started.elapsed(), error)
                });
                queued.insert(handle.id(), (area, name, $tier));
            }
        }};
    }
    macro_rules! common {
        ($($path:tt)*) => { queue!(Tier::Common, $($path)*) };
    }
    macro_rules! mock_only {
        ($($path:tt)*) => { queue!(Tier::MockOnly, $($path)*) };
    }

    crate::for_each_spec!(common);
    if options.include_mock_only {
        crate::for_each_mock_only_spec!(mock_only);
    }

    let mut outcomes = Vec::with_capacity(queued.len());
    while let Some(joined) = set.join_next_with_id().await {
        let (id, duration, error) = match joined {
            Ok((id, (duration, error))) => (id, duration, error),
            Err(e) => (e.id(), Duration::ZERO, Some(format!("spec task failed: {e}"))),
        };
        let Some((area, name, tier)) = queued.remove(&id) else {
            continue;
        };
        tracing::debug!(area, name, ok = error.is_none(), ?duration, "spec finished");
        outcomes.push(Outcome {
            area,
            name,
            tier,
            duration,
            error,
        });
    }

    outcomes.sort_by(|a, b| (a.area, a.name).cmp(&(b.area, b.name)));
    Report { outcomes }
}
