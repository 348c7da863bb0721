//! External model decision provider.
//!
//! Shells out to a local `ollama run <model>` subprocess with the turn
//! context and the numbered option list, and expects an answer of the
//! form `N - <option label> | <role-play comment>`. The subprocess owns
//! no state; every failure mode (spawn error, timeout, malformed reply)
//! degrades to a uniform-random choice and is logged, never fatal.

use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use skirmish_core::ActionOption;

use super::{Decision, DecisionProvider, ProviderError, RandomProvider};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Model-driven provider with random fallback.
pub struct OllamaProvider {
    model: String,
    timeout: Duration,
    fallback: RandomProvider,
}

impl OllamaProvider {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            timeout: DEFAULT_TIMEOUT,
            fallback: RandomProvider::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_prompt(context: &str, options: &[ActionOption]) -> String {
        let mut prompt = String::from(
            "You are controlling a character in a turn-based tactical game. \
             Here is the context of your turn:\n",
        );
        prompt.push_str(context);
        prompt.push_str("\nHere are the possible action strings:\n");
        for (index, option) in options.iter().enumerate() {
            prompt.push_str(&format!("{index} - {}\n", option.label));
        }
        prompt.push_str(
            "Given the context, select the most appropriate action.\n\
             Start your answer with the action string exactly as listed.\n\
             Add a '|' character, then finish with a single short role-play sentence.\n\
             Answer example:\n\
             2 - move east | She slips silently between the trees.\n",
        );
        prompt
    }

    /// Parses `N - ... | comment` back to the option at index N.
    fn parse_reply(reply: &str, options: &[ActionOption]) -> Option<Decision> {
        let (head, _) = reply.split_once('-')?;
        let index: usize = head.trim().parse().ok()?;
        let option = options.get(index)?;
        let comment = reply
            .split_once('|')
            .map(|(_, c)| c.trim().to_string())
            .filter(|c| !c.is_empty());
        Some(Decision {
            label: option.label.clone(),
            comment,
        })
    }

    /// Runs the subprocess with a hard timeout; the reader thread owns the
    /// pipe so a hung model cannot block the session.
    fn query_model(&self, prompt: &str) -> Result<String, String> {
        let mut child = Command::new("ollama")
            .arg("run")
            .arg(&self.model)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| format!("spawn failed: {e}"))?;

        let mut stdin = child.stdin.take().ok_or("no stdin pipe")?;
        stdin
            .write_all(prompt.as_bytes())
            .map_err(|e| format!("write failed: {e}"))?;
        drop(stdin);

        let mut stdout = child.stdout.take().ok_or("no stdout pipe")?;
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut output = String::new();
            let _ = stdout.read_to_string(&mut output);
            let _ = tx.send(output);
        });

        match rx.recv_timeout(self.timeout) {
            Ok(output) => {
                let _ = child.wait();
                Ok(output.trim().to_string())
            }
            Err(_) => {
                let _ = child.kill();
                let _ = child.wait();
                Err("timed out".to_string())
            }
        }
    }
}

impl DecisionProvider for OllamaProvider {
    fn choose(
        &mut self,
        context: &str,
        options: &[ActionOption],
    ) -> Result<Decision, ProviderError> {
        if options.is_empty() {
            return Err(ProviderError::NoOptions);
        }

        let prompt = Self::build_prompt(context, options);
        match self.query_model(&prompt) {
            Ok(reply) => match Self::parse_reply(&reply, options) {
                Some(decision) => Ok(decision),
                None => {
                    tracing::warn!(model = %self.model, %reply, "malformed model reply, falling back to random");
                    self.fallback.choose(context, options)
                }
            },
            Err(reason) => {
                tracing::warn!(model = %self.model, %reason, "model query failed, falling back to random");
                self.fallback.choose(context, options)
            }
        }
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
    fn replies_resolve_to_the_indexed_option() {
        let opts = options();
        let decision =
            OllamaProvider::parse_reply("1 - look around | Eyes scan the treeline.", &opts)
                .unwrap();
        assert_eq!(decision.label, "look around");
        assert_eq!(decision.comment.as_deref(), Some("Eyes scan the treeline."));
    }

    #[test]
    fn comments_are_optional() {
        let opts = options();
        let decision = OllamaProvider::parse_reply("0 - end turn", &opts).unwrap();
        assert_eq!(decision.label, "end turn");
        assert_eq!(decision.comment, None);
    }

    #[test]
    fn malformed_replies_are_rejected_for_fallback() {
        let opts = options();
        assert!(OllamaProvider::parse_reply("I attack the darkness", &opts).is_none());
        assert!(OllamaProvider::parse_reply("9 - end turn", &opts).is_none());
        assert!(OllamaProvider::parse_reply("", &opts).is_none());
    }

    #[test]
    fn prompt_numbers_every_option() {
        let prompt = OllamaProvider::build_prompt("ctx", &options());
        assert!(prompt.contains("0 - end turn"));
        assert!(prompt.contains("1 - look around"));
        assert!(prompt.contains("2 - rest"));
    }
}
