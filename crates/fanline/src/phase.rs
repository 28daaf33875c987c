use core::fmt;

/// Lifecycle of a pipeline run. Phases only ever move forward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Phase {
    /// The generator is still producing.
    #[default]
    Running,
    /// The generator has closed the input queue; workers and collectors are
    /// flushing what is in flight.
    Draining,
    /// The merged queue has closed and every value has been counted.
    Merged,
    /// Counts and sums have been compared.
    Validated,
    /// The run is over, successfully or not.
    Terminal,
}

impl Phase {
    /// Moves to `next` if it lies ahead of the current phase. Returns whether
    /// the phase changed.
    pub fn advance(&mut self, next: Self) -> bool {
        if next > *self {
            #[cfg(feature = "tracing")]
            tracing::debug!("Pipeline phase {self} -> {next}");
            *self = next;
            true
        } else {
            false
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Merged => "merged",
            Self::Validated => "validated",
            Self::Terminal => "terminal",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_forward_only() {
        let mut phase = Phase::Running;
        assert!(phase.advance(Phase::Merged));
        assert!(!phase.advance(Phase::Draining));
        assert!(!phase.advance(Phase::Merged));
        assert_eq!(phase, Phase::Merged);
        assert!(phase.advance(Phase::Terminal));
        assert_eq!(phase.to_string(), "terminal");
    }
}
