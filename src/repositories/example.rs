//! Sample `Person` data for checking connectivity.

use rand::Rng;

use super::graph::CLEAR_ALL;
use crate::context::{AppGraph, Context};
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::{Label, QueryExt, Statement};

const SAMPLE_PEOPLE: [&str; 3] = ["Alice", "Bob", "Charlie"];
const SAMPLE_RELATIONSHIPS: [(&str, &str, &str); 2] =
    [("Alice", "Bob", "KNOWS"), ("Alice", "Charlie", "FRIENDS_WITH")];

/// Repository for the connectivity demo.
#[derive(FromContext, Clone)]
pub struct ExampleRepository {
    graph: AppGraph,
}

impl ExampleRepository {
    /// Replaces the database content with three people (random ages
    /// 20-90) and two relationships.
    pub async fn write_sample(&self) -> Result<(), AppError> {
        let people: Vec<_> = {
            let mut rng = rand::thread_rng();
            SAMPLE_PEOPLE
                .iter()
                .map(|name| serde_json::json!({"name": name, "age": rng.gen_range(20..=90)}))
                .collect()
        };

        let mut statements = vec![
            Statement::new(CLEAR_ALL),
            Statement::new("UNWIND $people AS p CREATE (:Person {name: p.name, age: p.age})")
                .param("people", people),
        ];
        for (from, to, rel_type) in SAMPLE_RELATIONSHIPS {
            let rel_type = Label::new(rel_type)?;
            statements.push(
                Statement::new(format!(
                    "MATCH (a:Person {{name: $from}}), (b:Person {{name: $to}})
                     CREATE (a)-[:{rel_type}]->(b)"
                ))
                .param("from", from)
                .param("to", to),
            );
        }
        self.graph.run_batch(statements).await
    }

    /// People as `(name, age)`, ordered by name.
    pub async fn people(&self) -> Result<Vec<(String, Option<i64>)>, AppError> {
        self.graph
            .query("MATCH (p:Person) RETURN p.name AS name, p.age AS age ORDER BY p.name")
            .fetch_all()
            .await?
            .iter()
            .map(|row| Ok((row.get("name")?, row.get_opt("age")?)))
            .collect()
    }

    /// Relationships between people as `(from, type, to)`.
    pub async fn relations(&self) -> Result<Vec<(String, String, String)>, AppError> {
        self.graph
            .query(
                "MATCH (a:Person)-[r]->(b:Person)
                 RETURN a.name AS from, type(r) AS relation, b.name AS to
                 ORDER BY from, to",
            )
            .fetch_all()
            .await?
            .iter()
            .map(|row| Ok((row.get("from")?, row.get("relation")?, row.get("to")?)))
            .collect()
    }
}
