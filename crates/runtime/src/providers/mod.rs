//! Decision providers: interchangeable sources of actor intent.
//!
//! The session hands a provider the turn context and the exact option
//! labels; the provider returns one label verbatim plus an optional
//! role-play comment. Three implementations exist: the manual terminal
//! prompt (in the CLI crate), the uniform-random choice, and the external
//! model subprocess which always degrades to random rather than failing.

mod ollama;

pub use ollama::OllamaProvider;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use skirmish_core::ActionOption;

/// A selected option label, echoed verbatim, with optional flavor text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    pub label: String,
    pub comment: Option<String>,
}

impl Decision {
    pub fn plain(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            comment: None,
        }
    }
}

/// Provider failures. Only truly unrecoverable conditions belong here;
/// flaky external sources must fall back to a random choice instead.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("no options to choose from")]
    NoOptions,

    #[error("failed to read player input")]
    Input(#[from] std::io::Error),
}

/// Blocking source of one decision per call.
pub trait DecisionProvider {
    fn choose(
        &mut self,
        context: &str,
        options: &[ActionOption],
    ) -> Result<Decision, ProviderError>;
}

/// Uniform-random choice: the failsafe everything else degrades to.
pub struct RandomProvider {
    rng: SmallRng,
}

impl RandomProvider {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionProvider for RandomProvider {
    fn choose(
        &mut self,
        _context: &str,
        options: &[ActionOption],
    ) -> Result<Decision, ProviderError> {
        if options.is_empty() {
            return Err(ProviderError::NoOptions);
        }
        let index = self.rng.gen_range(0..options.len());
        Ok(Decision::plain(options[index].label.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::ActionCommand;

    fn options() -> Vec<ActionOption> {
        [
            ActionCommand::EndTurn,
            ActionCommand::LookAround,
            ActionCommand::Rest,
        ]
        .into_iter()
        .map(|command| {
            let label = command.to_string();
            ActionOption { command, label }
        })
        .collect()
    }

    #[test]
    fn random_choice_always_returns_an_offered_label() {
        let opts = options();
        let mut provider = RandomProvider::seeded(1);
        for _ in 0..50 {
            let decision = provider.choose("ctx", &opts).unwrap();
            assert!(opts.iter().any(|o| o.label == decision.label));
        }
    }

    #[test]
    fn empty_menus_are_rejected() {
        let mut provider = RandomProvider::seeded(1);
        assert!(matches!(
            provider.choose("ctx", &[]),
            Err(ProviderError::NoOptions)
        ));
    }
}
