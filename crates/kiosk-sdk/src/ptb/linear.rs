use std::collections::{BTreeSet, HashMap};
use std::fmt;

use thiserror::Error;

use super::{Argument, Usage};

/// A linear result: output `result` of command `command`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token {
    pub command: u16,
    pub result: u16,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.command, self.result)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinearityViolation {
    #[error("token {token} is never consumed")]
    Unconsumed { token: Token },

    #[error("token {token} consumed by command {first} and again by command {second}")]
    DoubleConsume { token: Token, first: u16, second: u16 },

    #[error("command {command} uses token {token} after command {consumed_by} consumed it")]
    UseAfterConsume {
        token: Token,
        command: u16,
        consumed_by: u16,
    },

    #[error("command {command} uses token {token} before it is produced")]
    UseBeforeProduce { token: Token, command: u16 },

    #[error("command {command} consumes {argument:?}, which is not a linear result")]
    NotAToken { argument: Argument, command: u16 },
}

fn referenced(argument: &Argument) -> Option<Token> {
    match *argument {
        Argument::Result { index } => Some(Token {
            command: index,
            result: 0,
        }),
        Argument::NestedResult {
            index,
            result_index,
        } => Some(Token {
            command: index,
            result: result_index,
        }),
        Argument::GasCoin | Argument::Input { .. } => None,
    }
}

#[derive(Default)]
struct Ledger {
    produced: BTreeSet<Token>,
    consumed: HashMap<Token, u16>,
}

impl Ledger {
    /// The linear token `argument` refers to, if any, after checking it is
    /// live at `command`.
    fn live_token(
        &self,
        argument: &Argument,
        command: u16,
    ) -> Result<Option<Token>, LinearityViolation> {
        let Some(token) = referenced(argument) else {
            return Ok(None);
        };
        if token.command >= command {
            return Err(LinearityViolation::UseBeforeProduce { token, command });
        }
        if !self.produced.contains(&token) {
            return Ok(None);
        }
        if let Some(&consumed_by) = self.consumed.get(&token) {
            return Err(LinearityViolation::UseAfterConsume {
                token,
                command,
                consumed_by,
            });
        }
        Ok(Some(token))
    }

    fn consume(&mut self, argument: &Argument, command: u16) -> Result<(), LinearityViolation> {
        let earlier = referenced(argument)
            .and_then(|token| self.consumed.get(&token).map(|&first| (token, first)));
        if let Some((token, first)) = earlier {
            return Err(LinearityViolation::DoubleConsume {
                token,
                first,
                second: command,
            });
        }
        let token = self
            .live_token(argument, command)?
            .ok_or(LinearityViolation::NotAToken {
                argument: *argument,
                command,
            })?;
        self.consumed.insert(token, command);
        Ok(())
    }
}

/// Replay a graph's usage records in command order.
///
/// Every linear result must be consumed exactly once, by a command after the
/// one producing it, and may only be borrowed between production and
/// consumption.
pub fn verify_linear(usages: &[Usage]) -> Result<(), LinearityViolation> {
    let mut ledger = Ledger::default();

    for (position, usage) in usages.iter().enumerate() {
        let command = u16::try_from(position).unwrap_or(u16::MAX);
        for argument in &usage.borrows {
            ledger.live_token(argument, command)?;
        }
        for argument in &usage.consumes {
            ledger.consume(argument, command)?;
        }
        for result in 0..usage.linear_results {
            ledger.produced.insert(Token { command, result });
        }
    }

    match ledger
        .produced
        .iter()
        .find(|token| !ledger.consumed.contains_key(token))
    {
        Some(&token) => Err(LinearityViolation::Unconsumed { token }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested(index: u16, result_index: u16) -> Argument {
        Argument::NestedResult {
            index,
            result_index,
        }
    }

    fn produce(n: u16) -> Usage {
        Usage {
            linear_results: n,
            ..Default::default()
        }
    }

    fn consume(args: &[Argument]) -> Usage {
        Usage {
            consumes: args.to_vec(),
            ..Default::default()
        }
    }

    fn borrow(args: &[Argument]) -> Usage {
        Usage {
            borrows: args.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn balanced_graph_passes() {
        let usages = [
            produce(2),
            borrow(&[nested(0, 0)]),
            consume(&[nested(0, 0), nested(0, 1)]),
        ];
        assert_eq!(verify_linear(&usages), Ok(()));
    }

    #[test]
    fn empty_graph_passes() {
        assert_eq!(verify_linear(&[]), Ok(()));
    }

    #[test]
    fn leftover_token_is_reported() {
        let usages = [produce(2), consume(&[nested(0, 0)])];
        assert_eq!(
            verify_linear(&usages),
            Err(LinearityViolation::Unconsumed {
                token: Token {
                    command: 0,
                    result: 1
                }
            })
        );
    }

    #[test]
    fn second_consumption_is_reported() {
        let usages = [
            produce(1),
            consume(&[nested(0, 0)]),
            consume(&[nested(0, 0)]),
        ];
        assert!(matches!(
            verify_linear(&usages),
            Err(LinearityViolation::DoubleConsume {
                first: 1,
                second: 2,
                ..
            })
        ));
    }

    #[test]
    fn borrow_after_consumption_is_reported() {
        let usages = [produce(1), consume(&[nested(0, 0)]), borrow(&[nested(0, 0)])];
        assert!(matches!(
            verify_linear(&usages),
            Err(LinearityViolation::UseAfterConsume {
                command: 2,
                consumed_by: 1,
                ..
            })
        ));
    }

    #[test]
    fn forward_reference_is_reported() {
        let usages = [borrow(&[nested(1, 0)]), produce(1)];
        assert!(matches!(
            verify_linear(&usages),
            Err(LinearityViolation::UseBeforeProduce { command: 0, .. })
        ));
    }

    #[test]
    fn inputs_cannot_be_consumed_as_tokens() {
        let usages = [consume(&[Argument::Input { index: 0 }])];
        assert!(matches!(
            verify_linear(&usages),
            Err(LinearityViolation::NotAToken { command: 0, .. })
        ));
    }

    #[test]
    fn plain_results_can_be_borrowed_freely() {
        let usages = [produce(0), borrow(&[Argument::Result { index: 0 }])];
        assert_eq!(verify_linear(&usages), Ok(()));
    }
}
