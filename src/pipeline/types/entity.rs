use image::RgbImage;
use std::sync::Arc;
use uuid::Uuid;

use super::PixelMask;

/// One segmented observation of an entity: the color image and the mask of
/// pixels that belong to the entity.
#[derive(Debug, Clone)]
pub struct EntityMeasurement {
    pub image: RgbImage,
    pub mask: PixelMask,
}

impl EntityMeasurement {
    pub fn new(image: RgbImage, mask: PixelMask) -> Self {
        Self { image, mask }
    }
}

/// Host entity handed to the matcher.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: Uuid,
    pub last_measurement: Option<Arc<EntityMeasurement>>,
}

impl Entity {
    pub fn new(measurement: EntityMeasurement) -> Self {
        Self {
            id: Uuid::new_v4(),
            last_measurement: Some(Arc::new(measurement)),
        }
    }

    pub fn without_measurement() -> Self {
        Self {
            id: Uuid::new_v4(),
            last_measurement: None,
        }
    }
}
