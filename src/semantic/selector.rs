use crate::graph::Intent;
use crate::semantic::searcher::PathResult;

/// Picks one path out of the candidates a search produced.
pub trait PathSelector: Send + Sync {
    /// `None` when there is nothing to pick or no candidate is preferred.
    fn select<'a>(&self, paths: &'a [PathResult]) -> Option<&'a PathResult>;
}

/// Shortest first; among equally short paths prefer one that leaves the
/// start screen, then the first found.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPathSelector;

impl PathSelector for DefaultPathSelector {
    fn select<'a>(&self, paths: &'a [PathResult]) -> Option<&'a PathResult> {
        let min = paths.iter().map(PathResult::len).min()?;
        let shortest: Vec<&PathResult> = paths.iter().filter(|p| p.len() == min).collect();

        if shortest.len() == 1 {
            return shortest.first().copied();
        }
        shortest
            .iter()
            .find(|p| p.changes_screen())
            .or_else(|| shortest.first())
            .copied()
    }
}

type IntentWeight = Box<dyn Fn(&Intent) -> f64 + Send + Sync>;

/// Lowest total of `risk(intent) * stability(intent)` wins; ties keep the
/// earlier path.
pub struct WeightedPathSelector {
    risk: IntentWeight,
    stability: IntentWeight,
}

impl Default for WeightedPathSelector {
    fn default() -> Self {
        Self {
            risk: Box::new(|_| 1.0),
            stability: Box::new(|_| 1.0),
        }
    }
}

impl WeightedPathSelector {
    pub fn new(
        risk: impl Fn(&Intent) -> f64 + Send + Sync + 'static,
        stability: impl Fn(&Intent) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            risk: Box::new(risk),
            stability: Box::new(stability),
        }
    }

    fn weight(&self, path: &PathResult) -> f64 {
        path.path
            .iter()
            .map(|i| (self.risk)(i) * (self.stability)(i))
            .sum()
    }
}

impl PathSelector for WeightedPathSelector {
    fn select<'a>(&self, paths: &'a [PathResult]) -> Option<&'a PathResult> {
        let mut best: Option<(&PathResult, f64)> = None;
        for path in paths {
            let weight = self.weight(path);
            match best {
                Some((_, lowest)) if weight >= lowest => {}
                _ => best = Some((path, weight)),
            }
        }
        best.map(|(path, _)| path)
    }
}
