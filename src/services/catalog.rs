use crate::{error::ApiError, models::meal::MealType};

/// Immutable meal-type catalog, built once from configuration.
pub struct MealCatalog {
    meals: Vec<MealType>,
}

impl MealCatalog {
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let meals = names
            .iter()
            .enumerate()
            .map(|(i, name)| MealType {
                id: i as i64 + 1,
                name: name.as_ref().to_string(),
            })
            .collect();
        Self { meals }
    }

    pub fn list(&self) -> &[MealType] {
        &self.meals
    }

    pub fn get(&self, id: i64) -> Result<&MealType, ApiError> {
        self.meals
            .iter()
            .find(|m| m.id == id)
            .ok_or(ApiError::UnknownMealType(id))
    }
}
