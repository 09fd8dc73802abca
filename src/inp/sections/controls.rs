//! Rule-based controls
//!
//! ```text
//! RULE R1
//! IF NODE J1 DEPTH > 4
//! OR NODE J2 DEPTH > 4
//! THEN PUMP P1 STATUS = ON
//! ELSE PUMP P1 STATUS = OFF
//! PRIORITY 2
//! ```

use crate::inp::coercion::Value;
use crate::inp::error::SchemaError;
use crate::inp::lexing::Tokens;
use crate::inp::record::{Cursor, Field};
use crate::inp::schema::{Grouping, RecordType};
use crate::inp::sections::network::render_f64;

const RULE: &str = "RULE";
const IF: &str = "IF";
const AND: &str = "AND";
const OR: &str = "OR";
const THEN: &str = "THEN";
const ELSE: &str = "ELSE";
const PRIORITY: &str = "PRIORITY";

crate::keyword_enum! {
    /// How a premise joins the ones before it.
    pub enum Connector {
        If => "IF",
        And => "AND",
        Or => "OR",
    }
}

/// One premise of a rule, e.g. `AND NODE J1 DEPTH > 4`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub connector: Connector,
    pub clause: Tokens,
}

impl Field for Condition {
    fn from_token(_token: &str) -> Option<Self> {
        None
    }

    fn to_value(&self) -> Value {
        Value::List(vec![self.connector.to_value(), self.clause.to_value()])
    }

    fn from_value(value: Value) -> Option<Self> {
        let (connector, clause) = <(Connector, Tokens)>::from_value(value)?;
        Some(Condition { connector, clause })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Opened,
    Premises,
    Actions,
    ElseActions,
    Closed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Control {
    pub name: String,
    pub conditions: Vec<Condition>,
    pub actions: Vec<Tokens>,
    pub else_actions: Vec<Tokens>,
    pub priority: Option<f64>,
}

crate::impl_record! {
    Control {
        kind: "Control",
        identifier: ["Name"],
        fields: {
            "Name" => name,
            "Conditions" => conditions,
            "Actions" => actions,
            "ElseActions" => else_actions,
            "Priority" => priority,
        },
    }
}

impl RecordType for Control {
    const GROUPING: Grouping = Grouping::KeywordBlock { start: RULE };
    const TABLE_EXPORT: bool = false;

    fn parse(lines: &[Tokens]) -> Result<Self, SchemaError> {
        let (first, body) = lines.split_first().ok_or_else(|| SchemaError::missing(RULE))?;
        let mut cursor = Cursor::new(first);
        match cursor.next_token() {
            Some(keyword) if keyword.eq_ignore_ascii_case(RULE) => {}
            Some(other) => return Err(SchemaError::UnknownKeyword(other.to_string())),
            None => return Err(SchemaError::missing(RULE)),
        }
        let mut control = Control {
            name: cursor.required("Name")?,
            ..Control::default()
        };
        cursor.finish()?;

        let mut phase = Phase::Opened;
        for line in body {
            let Some((keyword, clause)) = line.split_first() else {
                continue;
            };
            let keyword = keyword.to_ascii_uppercase();
            let clause = clause.to_vec();
            phase = control.accept(phase, &keyword, clause)?;
        }

        match phase {
            Phase::Opened => Err(SchemaError::missing(IF)),
            Phase::Premises => Err(SchemaError::missing(THEN)),
            _ => Ok(control),
        }
    }

    fn lines(&self) -> Vec<Tokens> {
        let mut lines = vec![vec![RULE.to_string(), self.name.clone()]];
        for condition in &self.conditions {
            lines.push(clause_line(condition.connector.as_str(), &condition.clause));
        }
        for (index, action) in self.actions.iter().enumerate() {
            lines.push(clause_line(if index == 0 { THEN } else { AND }, action));
        }
        for (index, action) in self.else_actions.iter().enumerate() {
            lines.push(clause_line(if index == 0 { ELSE } else { AND }, action));
        }
        if let Some(priority) = self.priority {
            lines.push(vec![PRIORITY.to_string(), render_f64(priority)]);
        }
        lines
    }
}

impl Control {
    /// Feed one body line to the rule, returning the phase it leaves the rule in.
    fn accept(&mut self, phase: Phase, keyword: &str, clause: Tokens) -> Result<Phase, SchemaError> {
        if phase == Phase::Closed {
            return Err(SchemaError::Malformed(format!(
                "`{keyword}` after PRIORITY in rule `{}`",
                self.name
            )));
        }
        match (keyword, phase) {
            (IF, Phase::Opened) => {
                self.push_condition(Connector::If, clause)?;
                Ok(Phase::Premises)
            }
            (IF, _) => Err(SchemaError::DuplicateClause(IF.to_string())),
            (AND, Phase::Premises) => {
                self.push_condition(Connector::And, clause)?;
                Ok(phase)
            }
            (OR, Phase::Premises) => {
                self.push_condition(Connector::Or, clause)?;
                Ok(phase)
            }
            (AND, Phase::Actions) => {
                self.actions.push(non_empty(AND, clause)?);
                Ok(phase)
            }
            (AND, Phase::ElseActions) => {
                self.else_actions.push(non_empty(AND, clause)?);
                Ok(phase)
            }
            (THEN, Phase::Premises) => {
                self.actions.push(non_empty(THEN, clause)?);
                Ok(Phase::Actions)
            }
            (THEN, Phase::Actions | Phase::ElseActions) => {
                Err(SchemaError::DuplicateClause(THEN.to_string()))
            }
            (ELSE, Phase::Actions) => {
                self.else_actions.push(non_empty(ELSE, clause)?);
                Ok(Phase::ElseActions)
            }
            (ELSE, Phase::ElseActions) => Err(SchemaError::DuplicateClause(ELSE.to_string())),
            (PRIORITY, Phase::Actions | Phase::ElseActions) => {
                let mut cursor = Cursor::new(&clause);
                self.priority = Some(cursor.required("Priority")?);
                cursor.finish()?;
                Ok(Phase::Closed)
            }
            (AND | OR | THEN | ELSE | PRIORITY, _) => Err(SchemaError::Malformed(format!(
                "`{keyword}` is out of place in rule `{}`",
                self.name
            ))),
            (other, _) => Err(SchemaError::UnknownKeyword(other.to_string())),
        }
    }

    fn push_condition(&mut self, connector: Connector, clause: Tokens) -> Result<(), SchemaError> {
        let clause = non_empty(connector.as_str(), clause)?;
        self.conditions.push(Condition { connector, clause });
        Ok(())
    }
}

fn non_empty(keyword: &str, clause: Tokens) -> Result<Tokens, SchemaError> {
    if clause.is_empty() {
        Err(SchemaError::Malformed(format!("`{keyword}` without a clause")))
    } else {
        Ok(clause)
    }
}

fn clause_line(keyword: &str, clause: &[String]) -> Tokens {
    let mut line = Vec::with_capacity(clause.len() + 1);
    line.push(keyword.to_string());
    line.extend(clause.iter().cloned());
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inp::record::Record;

    fn rule(text: &str) -> Vec<Tokens> {
        text.lines()
            .map(|line| line.split_whitespace().map(String::from).collect())
            .collect()
    }

    const FULL_RULE: &str = "RULE R1
IF NODE J1 DEPTH > 4
OR NODE J2 DEPTH > 4
AND SIMULATION TIME > 2
THEN PUMP P1 STATUS = ON
AND ORIFICE O1 SETTING = 0.5
ELSE PUMP P1 STATUS = OFF
PRIORITY 2";

    #[test]
    fn test_full_rule() {
        let control = Control::parse(&rule(FULL_RULE)).unwrap();
        assert_eq!(control.name, "R1");
        let connectors: Vec<Connector> =
            control.conditions.iter().map(|c| c.connector).collect();
        assert_eq!(connectors, vec![Connector::If, Connector::Or, Connector::And]);
        assert_eq!(control.actions.len(), 2);
        assert_eq!(control.else_actions.len(), 1);
        assert_eq!(control.priority, Some(2.0));
        assert_eq!(control.to_tokens(), rule(FULL_RULE));
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let control = Control::parse(&rule("rule R2\nif NODE J1 DEPTH > 1\nthen PUMP P1 STATUS = ON")).unwrap();
        assert_eq!(control.to_tokens()[1][0], "IF");
        assert_eq!(control.to_tokens()[2][0], "THEN");
        assert_eq!(control.get("Priority"), Ok(Value::Missing));
    }

    #[test]
    fn test_duplicate_then() {
        let text = "RULE R1\nIF A\nTHEN B\nTHEN C";
        assert_eq!(
            Control::parse(&rule(text)),
            Err(SchemaError::DuplicateClause("THEN".into()))
        );
    }

    #[test]
    fn test_missing_then() {
        assert_eq!(
            Control::parse(&rule("RULE R1\nIF A")),
            Err(SchemaError::missing("THEN"))
        );
    }

    #[test]
    fn test_or_after_then_is_malformed() {
        let result = Control::parse(&rule("RULE R1\nIF A\nTHEN B\nOR C"));
        assert!(matches!(result, Err(SchemaError::Malformed(_))));
    }

    #[test]
    fn test_lines_after_priority_are_rejected() {
        let result = Control::parse(&rule("RULE R1\nIF A\nTHEN B\nPRIORITY 1\nAND C"));
        assert!(matches!(result, Err(SchemaError::Malformed(_))));
    }

    #[test]
    fn test_unknown_clause_keyword() {
        assert_eq!(
            Control::parse(&rule("RULE R1\nWHEN A")),
            Err(SchemaError::UnknownKeyword("WHEN".into()))
        );
    }

    #[test]
    fn test_conditions_are_settable() {
        let mut control = Control::parse(&rule("RULE R1\nIF A\nTHEN B")).unwrap();
        let condition = Condition {
            connector: Connector::And,
            clause: vec!["C".into()],
        };
        let mut conditions = control.conditions.clone();
        conditions.push(condition);
        control
            .set("Conditions", conditions.to_value())
            .unwrap();
        assert_eq!(control.conditions.len(), 2);
    }
}
