//! Exercise catalogue and image upload.

use std::sync::Arc;

use log::{debug, info};

use crate::domain::error::{DomainError, DomainResult, FieldErrorKind, ValidationErrors};
use crate::domain::models::exercise::{Exercise, ExerciseDraft, ImageUpload, MAX_DESCRIPTION_CHARS, MAX_IMAGE_BYTES};
use crate::storage::ExerciseStorage;

#[derive(Clone)]
pub struct ExerciseService {
    storage: Arc<dyn ExerciseStorage>,
}

impl ExerciseService {
    pub fn new(storage: Arc<dyn ExerciseStorage>) -> Self {
        Self { storage }
    }

    pub fn validate(draft: &ExerciseDraft) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let name = draft.name.trim();
        if name.is_empty() {
            errors.push("name", FieldErrorKind::Required);
        } else if name.chars().count() < 3 {
            errors.push("name", FieldErrorKind::TooShort(3));
        }
        if draft.description.trim().chars().count() > MAX_DESCRIPTION_CHARS {
            errors.push("description", FieldErrorKind::TooLong(MAX_DESCRIPTION_CHARS));
        }
        errors
    }

    pub fn validate_image(image: &ImageUpload) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if !image.content_type.trim().to_lowercase().starts_with("image/") {
            errors.push("image", FieldErrorKind::NotAnImage);
        }
        if image.bytes.is_empty() {
            errors.push("image", FieldErrorKind::Required);
        } else if image.bytes.len() > MAX_IMAGE_BYTES {
            errors.push(
                "image",
                FieldErrorKind::FileTooLarge {
                    max_bytes: MAX_IMAGE_BYTES,
                },
            );
        }
        errors
    }

    fn normalise(draft: &ExerciseDraft) -> ExerciseDraft {
        ExerciseDraft {
            name: draft.name.trim().to_string(),
            description: draft.description.trim().to_string(),
            group_id: draft.group_id.clone().filter(|g| !g.trim().is_empty()),
            muscles: draft.muscles.clone(),
            image_url: draft.image_url.clone(),
        }
    }

    pub async fn create(&self, draft: &ExerciseDraft) -> DomainResult<Exercise> {
        Self::validate(draft).into_result()?;
        let exercise = self.storage.create_exercise(&Self::normalise(draft)).await?;
        info!("🏋️ Created exercise {} ({})", exercise.name, exercise.id);
        Ok(exercise)
    }

    pub async fn update(&self, exercise_id: &str, draft: &ExerciseDraft) -> DomainResult<Exercise> {
        Self::validate(draft).into_result()?;
        let exercise = self
            .storage
            .update_exercise(exercise_id, &Self::normalise(draft))
            .await?;
        info!("🏋️ Updated exercise {}", exercise.id);
        Ok(exercise)
    }

    pub async fn delete(&self, exercise_id: &str) -> DomainResult<()> {
        if !self.storage.delete_exercise(exercise_id).await? {
            return Err(DomainError::NotFound(format!("exercise {} not found", exercise_id)));
        }
        info!("🏋️ Deleted exercise {}", exercise_id);
        Ok(())
    }

    pub async fn get(&self, exercise_id: &str) -> DomainResult<Exercise> {
        self.storage
            .get_exercise(exercise_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("exercise {} not found", exercise_id)))
    }

    pub async fn list(&self) -> DomainResult<Vec<Exercise>> {
        let exercises = self.storage.list_exercises().await?;
        debug!("Found {} exercises", exercises.len());
        Ok(exercises)
    }

    /// Upload the exercise image and return its public URL
    pub async fn upload_image(&self, exercise_id: &str, image: &ImageUpload) -> DomainResult<String> {
        Self::validate_image(image).into_result()?;
        debug!(
            "Uploading {} ({} bytes) for exercise {}",
            image.file_name,
            image.bytes.len(),
            exercise_id
        );
        let url = self.storage.upload_image(exercise_id, image).await?;
        info!("🏋️ Stored image for exercise {} at {}", exercise_id, url);
        Ok(url)
    }
}
