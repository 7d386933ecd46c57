use serde::Deserialize;
use validator::Validate;

use crate::models::vehicle::VehicleStatus;

/// Request para crear un nuevo vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 4, max = 20))]
    pub license_plate: String,

    #[validate(length(min = 1, max = 60))]
    pub brand: String,

    #[validate(length(min = 1, max = 60))]
    pub model: String,

    #[validate(range(min = 1980, max = 2035))]
    pub year: Option<i32>,

    #[validate(length(max = 30))]
    pub color: Option<String>,

    #[validate(length(max = 20))]
    pub fuel_type: Option<String>,
}

/// Request para actualizar un vehículo existente
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 4, max = 20))]
    pub license_plate: Option<String>,

    #[validate(length(min = 1, max = 60))]
    pub brand: Option<String>,

    #[validate(length(min = 1, max = 60))]
    pub model: Option<String>,

    #[validate(range(min = 1980, max = 2035))]
    pub year: Option<i32>,

    #[validate(length(max = 30))]
    pub color: Option<String>,

    #[validate(length(max = 20))]
    pub fuel_type: Option<String>,

    pub status: Option<VehicleStatus>,
}
