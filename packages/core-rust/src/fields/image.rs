use serde_json::{json, Value};

use super::{mismatch, required_message, single, FieldController, Payload};
use crate::accessor::SafeAccessor;
use crate::schema::{FieldDescriptor, ImageConfig, ValidationResult};
use crate::selection::Selection;
use crate::value::{EditValue, FieldValue, ImageData, ImageValue};

/// File extensions offered to users, in display order.
pub const ACCEPTED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "png", "webp", "gif"];

/// `Sorry, that file type isn't accepted. Please try .jpg, .png, .webp or .gif.`
fn unsupported_type_message() -> String {
    let dotted: Vec<String> = ACCEPTED_IMAGE_EXTENSIONS
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect();
    let listed = match dotted.split_last() {
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} or {last}", rest.join(", ")),
        None => String::new(),
    };
    format!("Sorry, that file type isn't accepted. Please try {listed}.")
}

#[derive(Debug, Clone)]
pub struct ImageController {
    descriptor: FieldDescriptor,
    config: ImageConfig,
}

impl ImageController {
    #[must_use]
    pub fn new(descriptor: &FieldDescriptor, config: &ImageConfig) -> Self {
        Self {
            descriptor: descriptor.clone(),
            config: config.clone(),
        }
    }
}

impl FieldController for ImageController {
    fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    fn default_value(&self) -> EditValue {
        EditValue::create(FieldValue::Image(ImageValue::Empty))
    }

    fn deserialize(&self, item: &SafeAccessor) -> EditValue {
        let stored = item.get(self.path());
        let image = match stored.data() {
            Value::Null => ImageValue::Empty,
            data => match serde_json::from_value::<ImageData>(data.clone()) {
                Ok(data) => ImageValue::FromServer { data },
                Err(err) => {
                    tracing::debug!(path = self.path(), error = %err, "stored image metadata is malformed");
                    ImageValue::Empty
                }
            },
        };
        EditValue::update(FieldValue::Image(image))
    }

    fn serialize(&self, value: &EditValue) -> Payload {
        let FieldValue::Image(image) = value.value() else {
            return Payload::new();
        };
        let wire = match image {
            ImageValue::Empty | ImageValue::Remove { .. } => Value::Null,
            ImageValue::FromServer { data } => json!(data),
            ImageValue::Upload { upload, .. } => json!({ "upload": upload }),
        };
        single(self.path(), wire)
    }

    fn check(&self, value: &EditValue) -> ValidationResult {
        match value.value() {
            FieldValue::Image(ImageValue::Upload { upload, .. }) => {
                if upload.mime_type.starts_with("image/") {
                    ValidationResult::Valid
                } else {
                    ValidationResult::invalid(unsupported_type_message())
                }
            }
            FieldValue::Image(ImageValue::Empty | ImageValue::Remove { .. }) if self.config.is_required => {
                ValidationResult::invalid(required_message(self.label()))
            }
            FieldValue::Image(_) => ValidationResult::Valid,
            _ => mismatch(self.label()),
        }
    }

    fn selection(&self) -> Selection {
        Selection::nested(
            self.path(),
            &["id", "url", "extension", "width", "height", "filesize"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldConfig;
    use crate::value::ImageUpload;

    fn controller(is_required: bool) -> ImageController {
        let config = ImageConfig { is_required };
        let descriptor = FieldDescriptor::new("logo", "Logo", FieldConfig::Image(config.clone()));
        ImageController::new(&descriptor, &config)
    }

    fn stored() -> Value {
        json!({
            "logo": {
                "id": "img1",
                "url": "/images/img1.png",
                "extension": "png",
                "width": 64,
                "height": 32,
                "filesize": 2048
            }
        })
    }

    fn upload(mime_type: &str) -> ImageUpload {
        ImageUpload {
            file_name: "logo.bin".to_string(),
            mime_type: mime_type.to_string(),
            size: 10,
        }
    }

    #[test]
    fn rejects_non_image_uploads() {
        let logo = controller(false);
        let value = logo.deserialize(&SafeAccessor::from_data(stored()));
        let FieldValue::Image(image) = value.value().clone() else {
            panic!("expected image value");
        };
        let pdf = value.with_value(FieldValue::Image(image.clone().upload(upload("application/pdf"))));
        assert_eq!(
            logo.validate(&pdf).errors(),
            ["Sorry, that file type isn't accepted. Please try .jpg, .png, .webp or .gif.".to_string()]
        );
        let png = value.with_value(FieldValue::Image(image.upload(upload("image/png"))));
        assert!(logo.validate(&png).is_valid());
        assert_eq!(
            Value::Object(logo.serialize(&png))["logo"]["upload"]["mimeType"],
            "image/png"
        );
    }

    #[test]
    fn remove_serializes_null_and_undo_restores() {
        let logo = controller(true);
        let value = logo.deserialize(&SafeAccessor::from_data(stored()));
        let FieldValue::Image(image) = value.value().clone() else {
            panic!("expected image value");
        };
        let removed = value.with_value(FieldValue::Image(image.remove()));
        assert_eq!(Value::Object(logo.serialize(&removed)), json!({ "logo": null }));
        assert_eq!(logo.validate(&removed).errors(), ["Logo is required".to_string()]);

        let FieldValue::Image(removed_image) = removed.value().clone() else {
            panic!("expected image value");
        };
        let undone = removed.with_value(FieldValue::Image(removed_image.undo()));
        assert!(undone.is_unchanged());
    }

    #[test]
    fn server_metadata_round_trips() {
        let logo = controller(false);
        let first = logo.deserialize(&SafeAccessor::from_data(stored()));
        let again = logo.deserialize(&SafeAccessor::from_data(Value::Object(logo.serialize(&first))));
        assert_eq!(first, again);
    }
}
