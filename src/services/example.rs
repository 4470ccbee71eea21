//! Connectivity demo backed by a handful of `Person` nodes.

use crate::context::Context;
use crate::di::FromContext;
use crate::error::AppError;
use crate::repositories::ExampleRepository;

#[derive(FromContext, Clone)]
pub struct ExampleService {
    repo: ExampleRepository,
}

impl ExampleService {
    /// Replaces the database content with the sample people.
    pub async fn write(&self) -> Result<(), AppError> {
        self.repo.write_sample().await?;
        tracing::info!("Sample data written");
        Ok(())
    }

    /// The sample data as display lines.
    ///
    /// Fails with [`AppError::EmptyDatabase`] unless both people and
    /// relationships are present.
    pub async fn read_lines(&self) -> Result<Vec<String>, AppError> {
        let people = self.repo.people().await?;
        let relations = self.repo.relations().await?;
        if people.is_empty() || relations.is_empty() {
            return Err(AppError::EmptyDatabase);
        }
        Ok(display_lines(&people, &relations))
    }
}

pub fn display_lines(
    people: &[(String, Option<i64>)],
    relations: &[(String, String, String)],
) -> Vec<String> {
    let mut lines = vec!["People in the database:".to_string()];
    for (name, age) in people {
        let age = age.map_or_else(|| "unknown".to_string(), |a| a.to_string());
        lines.push(format!(" - {} (age {})", name, age));
    }
    lines.push(" ".to_string());
    lines.push("Relationships in the database:".to_string());
    for (from, relation, to) in relations {
        lines.push(format!(" - {} -[{}]-> {}", from, relation, to));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lines() {
        let people = vec![("Alice".to_string(), Some(34)), ("Bob".to_string(), None)];
        let relations = vec![("Alice".to_string(), "KNOWS".to_string(), "Bob".to_string())];
        assert_eq!(
            display_lines(&people, &relations),
            vec![
                "People in the database:",
                " - Alice (age 34)",
                " - Bob (age unknown)",
                " ",
                "Relationships in the database:",
                " - Alice -[KNOWS]-> Bob",
            ]
        );
    }
}
