//! FILENAME: core/tabulate/src/variables.rs
//! PURPOSE: Lists the variables of a dataset, split into rule variables and the rest.
//! CONTEXT: Rule variables drive rule-based redaction of categories. They all
//! derive from the dataset's rule base, and a table query may name at most one,
//! as its first variable. Datasets without rule-based redaction have a null
//! `ruleBase`.
//!
//! Expected document:
//!
//!   { "data": { "dataset": {
//!       "variables": { "edges": [ { "node": { "name": str } }, ... ] },
//!       "ruleBase": { "isSourceOf": { "edges": [ ... ] } } | null } },
//!     "errors": [ ... ] }

use std::collections::BTreeSet;
use std::io::{Read, Write};

use jsonstream::Decoder;
use log::debug;
use serde::Deserialize;

use crate::definition::{protocol_message, GraphQLError};
use crate::error::TableError;

// ============================================================================
// RESPONSE SHAPE
// ============================================================================

#[derive(Debug, Deserialize)]
struct VariablesResponse {
    data: Option<VariablesData>,
    errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Deserialize)]
struct VariablesData {
    dataset: Option<DatasetVariables>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatasetVariables {
    variables: Option<Connection>,
    rule_base: Option<RuleBase>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuleBase {
    is_source_of: Option<Connection>,
}

#[derive(Debug, Default, Deserialize)]
struct Connection {
    #[serde(default)]
    edges: Vec<Edge>,
}

#[derive(Debug, Deserialize)]
struct Edge {
    node: Node,
}

#[derive(Debug, Deserialize)]
struct Node {
    name: String,
}

impl Connection {
    fn names(self) -> BTreeSet<String> {
        self.edges.into_iter().map(|e| e.node.name).collect()
    }
}

// ============================================================================
// LISTING
// ============================================================================

/// Variable names of a dataset, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableListing {
    pub rule_variables: BTreeSet<String>,
    /// Every dataset variable that is not a rule variable.
    pub other_variables: BTreeSet<String>,
}

impl VariableListing {
    /// Reads a variables response. The document is small, so it is decoded whole.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut decoder = Decoder::new(reader);
        let response: VariablesResponse = decoder.decode_into()?;
        decoder.finish()?;

        if let Some(message) = protocol_message(response.errors.as_deref().unwrap_or_default()) {
            return Err(TableError::Protocol(message));
        }
        let Some(dataset) = response.data.and_then(|d| d.dataset) else {
            return Err(decoder.error("response contains no dataset").into());
        };

        let rule_variables = dataset
            .rule_base
            .and_then(|r| r.is_source_of)
            .map(Connection::names)
            .unwrap_or_default();
        let other_variables: BTreeSet<String> = dataset
            .variables
            .map(Connection::names)
            .unwrap_or_default()
            .difference(&rule_variables)
            .cloned()
            .collect();

        debug!(
            target: "TABLE",
            "{} rule variables, {} other variables",
            rule_variables.len(),
            other_variables.len()
        );
        Ok(VariableListing {
            rule_variables,
            other_variables,
        })
    }

    /// Renders both sections, each a title, an underline, then one name per line.
    pub fn write_to<W: Write>(&self, mut out: W) -> Result<(), TableError> {
        write_section(&mut out, "RULE VARIABLES", &self.rule_variables)?;
        writeln!(out)?;
        write_section(&mut out, "OTHER VARIABLES", &self.other_variables)?;
        out.flush()?;
        Ok(())
    }
}

fn write_section<W: Write>(
    out: &mut W,
    title: &str,
    names: &BTreeSet<String>,
) -> std::io::Result<()> {
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "-".repeat(title.len()))?;
    for name in names {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}
