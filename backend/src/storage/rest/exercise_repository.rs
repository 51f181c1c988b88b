use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use reqwest::multipart::{Form, Part};
use shared::{ExerciseDto, ImageUploadResponse};

use super::{deleted, found};
use crate::domain::mappers::ExerciseMapper;
use crate::domain::models::exercise::{Exercise, ExerciseDraft, ImageUpload};
use crate::io::ApiClient;
use crate::storage::ExerciseStorage;

/// Multipart field the backend reads the image from
const IMAGE_FIELD: &str = "imagem";

#[derive(Clone)]
pub struct RestExerciseRepository {
    client: Arc<ApiClient>,
}

impl RestExerciseRepository {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ExerciseStorage for RestExerciseRepository {
    async fn create_exercise(&self, exercise: &ExerciseDraft) -> Result<Exercise> {
        let dto: ExerciseDto = self.client.post_json("/exercicios", &ExerciseMapper::to_dto(exercise)).await?;
        Ok(ExerciseMapper::from_dto(dto)?)
    }

    async fn update_exercise(&self, exercise_id: &str, exercise: &ExerciseDraft) -> Result<Exercise> {
        let path = format!("/exercicios/{}", exercise_id);
        let mut dto: ExerciseDto = self.client.put_json(&path, &ExerciseMapper::to_dto(exercise)).await?;
        dto.id.get_or_insert_with(|| exercise_id.to_string());
        Ok(ExerciseMapper::from_dto(dto)?)
    }

    async fn delete_exercise(&self, exercise_id: &str) -> Result<bool> {
        let path = format!("/exercicios/{}", exercise_id);
        Ok(deleted(self.client.delete(&path).await)?)
    }

    async fn get_exercise(&self, exercise_id: &str) -> Result<Option<Exercise>> {
        let path = format!("/exercicios/{}", exercise_id);
        let dto = found(self.client.get_json::<ExerciseDto>(&path, &[]).await)?;
        Ok(dto.map(ExerciseMapper::from_dto).transpose()?)
    }

    async fn list_exercises(&self) -> Result<Vec<Exercise>> {
        let page = self.client.get_list::<ExerciseDto>("/exercicios", &[], "exercicios").await?;
        let exercises = page
            .items
            .into_iter()
            .map(ExerciseMapper::from_dto)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(exercises)
    }

    async fn upload_image(&self, exercise_id: &str, image: &ImageUpload) -> Result<String> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)?;
        let form = Form::new().part(IMAGE_FIELD, part);

        let path = format!("/exercicios/{}/imagem", exercise_id);
        let response: ImageUploadResponse = self.client.post_multipart(&path, form).await?;
        info!("🏋️ Uploaded image for exercise {}", exercise_id);
        Ok(response.url)
    }
}
