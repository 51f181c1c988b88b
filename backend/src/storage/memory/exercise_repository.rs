use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::connection::MemoryConnection;
use crate::domain::models::exercise::{Exercise, ExerciseDraft, ImageUpload};
use crate::domain::models::generate_id;
use crate::storage::{ExerciseStorage, StorageError};

#[derive(Clone)]
pub struct MemoryExerciseRepository {
    conn: Arc<MemoryConnection>,
}

impl MemoryExerciseRepository {
    pub fn new(conn: Arc<MemoryConnection>) -> Self {
        Self { conn }
    }
}

fn to_exercise(id: String, draft: &ExerciseDraft) -> Exercise {
    Exercise {
        id,
        name: draft.name.clone(),
        description: draft.description.clone(),
        group_id: draft.group_id.clone(),
        muscles: draft.muscles.clone(),
        image_url: draft.image_url.clone(),
    }
}

fn not_found(exercise_id: &str) -> StorageError {
    StorageError::NotFound(format!("exercise {} not found", exercise_id))
}

#[async_trait]
impl ExerciseStorage for MemoryExerciseRepository {
    async fn create_exercise(&self, exercise: &ExerciseDraft) -> Result<Exercise> {
        let mut tables = self.conn.write().await;
        let created = to_exercise(generate_id("exercicio"), exercise);
        tables.exercises.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn update_exercise(&self, exercise_id: &str, exercise: &ExerciseDraft) -> Result<Exercise> {
        let mut tables = self.conn.write().await;
        let existing = tables
            .exercises
            .get_mut(exercise_id)
            .ok_or_else(|| not_found(exercise_id))?;
        *existing = to_exercise(exercise_id.to_string(), exercise);
        Ok(existing.clone())
    }

    async fn delete_exercise(&self, exercise_id: &str) -> Result<bool> {
        Ok(self.conn.write().await.exercises.remove(exercise_id).is_some())
    }

    async fn get_exercise(&self, exercise_id: &str) -> Result<Option<Exercise>> {
        Ok(self.conn.read().await.exercises.get(exercise_id).cloned())
    }

    async fn list_exercises(&self) -> Result<Vec<Exercise>> {
        let tables = self.conn.read().await;
        let mut exercises: Vec<Exercise> = tables.exercises.values().cloned().collect();
        exercises.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(exercises)
    }

    async fn upload_image(&self, exercise_id: &str, image: &ImageUpload) -> Result<String> {
        let mut tables = self.conn.write().await;
        let existing = tables
            .exercises
            .get_mut(exercise_id)
            .ok_or_else(|| not_found(exercise_id))?;
        let url = format!("memory://exercicios/{}/{}", exercise_id, image.file_name);
        existing.image_url = Some(url.clone());
        Ok(url)
    }
}
