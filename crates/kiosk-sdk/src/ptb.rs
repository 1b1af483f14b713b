//! Programmable transaction graphs.
//!
//! A [`TransactionGraph`] is the ordered command list handed to the wallet for
//! signing. Alongside each command the builder records a [`Usage`]: how many
//! of its results are linear tokens, and which earlier tokens it borrows or
//! consumes. [`linear::verify_linear`] replays those records before anything
//! is submitted.

pub mod kiosk;
pub mod linear;

use serde::Serialize;

use crate::types::{ObjectId, SuiAddress};

use linear::{LinearityViolation, verify_linear};

/// Reference to a value inside the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind")]
pub enum Argument {
    GasCoin,
    Input {
        index: u16,
    },
    Result {
        index: u16,
    },
    NestedResult {
        index: u16,
        #[serde(rename = "resultIndex")]
        result_index: u16,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum PureValue {
    Address(SuiAddress),
    Id(ObjectId),
}

/// A transaction input. Object versions and digests are resolved by the
/// wallet at signing time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CallArg {
    Object {
        #[serde(rename = "objectId")]
        object_id: ObjectId,
    },
    Pure {
        value: PureValue,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCall {
    /// `package::module::function`
    pub target: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Command {
    MoveCall(MoveCall),
    TransferObjects {
        objects: Vec<Argument>,
        address: Argument,
    },
}

/// Linear-resource bookkeeping for one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Usage {
    /// Number of leading results that must be consumed later in the graph.
    pub linear_results: u16,
    /// Tokens read without being consumed.
    pub borrows: Vec<Argument>,
    /// Tokens this command uses up.
    pub consumes: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionGraph {
    version: u8,
    inputs: Vec<CallArg>,
    #[serde(rename = "transactions")]
    commands: Vec<Command>,
    #[serde(skip)]
    usages: Vec<Usage>,
}

impl TransactionGraph {
    pub fn inputs(&self) -> &[CallArg] {
        &self.inputs
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn usages(&self) -> &[Usage] {
        &self.usages
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Targets of the graph's move calls, in order.
    pub fn move_call_targets(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::MoveCall(call) => Some(call.target.as_str()),
                Command::TransferObjects { .. } => None,
            })
            .collect()
    }

    /// Simulated submission: reject graphs that leave a token unconsumed or
    /// use one out of order.
    pub fn verify(&self) -> std::result::Result<(), LinearityViolation> {
        verify_linear(&self.usages)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    inputs: Vec<CallArg>,
    commands: Vec<Command>,
    usages: Vec<Usage>,
}

fn index(len: usize) -> u16 {
    u16::try_from(len).unwrap_or(u16::MAX)
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Object input; the same object id always maps to the same input.
    pub fn object(&mut self, id: &ObjectId) -> Argument {
        let existing = self.inputs.iter().position(
            |input| matches!(input, CallArg::Object { object_id } if object_id == id),
        );
        let position = existing.unwrap_or_else(|| {
            self.inputs.push(CallArg::Object {
                object_id: id.clone(),
            });
            self.inputs.len() - 1
        });
        Argument::Input {
            index: index(position),
        }
    }

    pub fn pure(&mut self, value: PureValue) -> Argument {
        self.inputs.push(CallArg::Pure { value });
        Argument::Input {
            index: index(self.inputs.len() - 1),
        }
    }

    /// Append a command and return its index.
    pub fn command(&mut self, command: Command, usage: Usage) -> u16 {
        self.commands.push(command);
        self.usages.push(usage);
        index(self.commands.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn graph(&self) -> TransactionGraph {
        TransactionGraph {
            version: 1,
            inputs: self.inputs.clone(),
            commands: self.commands.clone(),
            usages: self.usages.clone(),
        }
    }

    /// Verified copy of the graph built so far.
    pub fn snapshot(&self) -> std::result::Result<TransactionGraph, LinearityViolation> {
        let graph = self.graph();
        graph.verify()?;
        Ok(graph)
    }

    pub fn finish(self) -> std::result::Result<TransactionGraph, LinearityViolation> {
        self.snapshot()
    }

    /// The graph as built, without the linear check.
    pub fn finish_unchecked(self) -> TransactionGraph {
        self.graph()
    }
}
