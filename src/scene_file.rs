//! Versioned JSON scene documents
//!
//! The document is what the editor exports and what the scene generator
//! returns: a version tag, the placed components with camelCase properties,
//! and the detector readings of the last trace pass.
//!
//! Import fills missing properties from the component catalog and rejects
//! unknown component types, duplicate ids and non-finite numbers.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::ComponentType;
use crate::sim::{Element, ElementId, ElementKind, Scene, SceneError, TraceResult};

/// Version tag written on export
pub const FORMAT_VERSION: &str = "1.0";

/// Errors while reading a scene document.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Malformed scene JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Component {id} has unknown type '{name}'")]
    UnknownType { id: u64, name: String },

    #[error("Scene document has no components list")]
    MissingComponents,

    #[error("Invalid scene: {0}")]
    Scene(#[from] SceneError),
}

/// Top-level scene document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub components: Vec<ComponentRecord>,
    #[serde(default)]
    pub detector_readings: Vec<DetectorReading>,
}

fn default_version() -> String {
    FORMAT_VERSION.to_string()
}

/// One placed component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub id: u64,
    /// Catalog name, e.g. `laser` or `convex_lens`
    #[serde(rename = "type")]
    pub component_type: String,
    pub position: Position,
    #[serde(default)]
    pub properties: Properties,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Union of all kind-specific properties; absent ones take catalog defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Properties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wavelength: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflectivity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focal_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

/// Derived reading, exported for reference only (ignored on import)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectorReading {
    pub detector_id: u64,
    pub intensity: f64,
    pub wavelength: f64,
}

impl Properties {
    fn from_kind(kind: &ElementKind) -> Self {
        match *kind {
            ElementKind::Source {
                angle,
                wavelength,
                intensity,
            } => Self {
                angle: Some(angle),
                wavelength: Some(wavelength),
                intensity: Some(intensity),
                ..Self::default()
            },
            ElementKind::Mirror {
                angle,
                reflectivity,
                length,
            } => Self {
                angle: Some(angle),
                reflectivity: Some(reflectivity),
                length: Some(length),
                ..Self::default()
            },
            ElementKind::BeamSplitter {
                angle,
                reflectivity,
            } => Self {
                angle: Some(angle),
                reflectivity: Some(reflectivity),
                ..Self::default()
            },
            ElementKind::Lens {
                focal_length,
                transparency,
                angle,
                diameter,
            } => Self {
                focal_length: Some(focal_length),
                transparency: Some(transparency),
                angle: Some(angle),
                diameter: Some(diameter),
                ..Self::default()
            },
            ElementKind::Detector { sensitivity, size } => Self {
                sensitivity: Some(sensitivity),
                size: Some(size),
                ..Self::default()
            },
        }
    }

    /// Overlay these properties on a kind's defaults
    fn apply(&self, defaults: ElementKind) -> ElementKind {
        match defaults {
            ElementKind::Source {
                angle,
                wavelength,
                intensity,
            } => ElementKind::Source {
                angle: self.angle.unwrap_or(angle),
                wavelength: self.wavelength.unwrap_or(wavelength),
                intensity: self.intensity.unwrap_or(intensity),
            },
            ElementKind::Mirror {
                angle,
                reflectivity,
                length,
            } => ElementKind::Mirror {
                angle: self.angle.unwrap_or(angle),
                reflectivity: self.reflectivity.unwrap_or(reflectivity),
                length: self.length.unwrap_or(length),
            },
            ElementKind::BeamSplitter {
                angle,
                reflectivity,
            } => ElementKind::BeamSplitter {
                angle: self.angle.unwrap_or(angle),
                reflectivity: self.reflectivity.unwrap_or(reflectivity),
            },
            ElementKind::Lens {
                focal_length,
                transparency,
                angle,
                diameter,
            } => ElementKind::Lens {
                focal_length: self.focal_length.unwrap_or(focal_length),
                transparency: self.transparency.unwrap_or(transparency),
                angle: self.angle.unwrap_or(angle),
                diameter: self.diameter.unwrap_or(diameter),
            },
            ElementKind::Detector { sensitivity, size } => ElementKind::Detector {
                sensitivity: self.sensitivity.unwrap_or(sensitivity),
                size: self.size.unwrap_or(size),
            },
        }
    }
}

impl ComponentRecord {
    pub fn from_element(element: &Element) -> Self {
        Self {
            id: element.id.0,
            component_type: ComponentType::of(&element.kind).as_str().to_string(),
            position: Position {
                x: element.position.x,
                y: element.position.y,
            },
            properties: Properties::from_kind(&element.kind),
        }
    }

    pub fn to_element(&self) -> Result<Element, ImportError> {
        let component_type =
            ComponentType::from_name(&self.component_type).ok_or_else(|| ImportError::UnknownType {
                id: self.id,
                name: self.component_type.clone(),
            })?;
        Ok(Element::new(
            self.id,
            DVec2::new(self.position.x, self.position.y),
            self.properties.apply(component_type.default_kind()),
        ))
    }
}

impl SceneDocument {
    /// Snapshot a scene, with readings from `result` if given
    pub fn export(scene: &Scene, result: Option<&TraceResult>) -> Self {
        let detector_readings = result
            .map(|r| {
                r.detector_hits
                    .iter()
                    .map(|(id, hit)| DetectorReading {
                        detector_id: id.0,
                        intensity: hit.intensity,
                        wavelength: hit.wavelength,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            version: FORMAT_VERSION.to_string(),
            timestamp: None,
            components: scene.elements().iter().map(ComponentRecord::from_element).collect(),
            detector_readings,
        }
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Rebuild the scene; readings are derived data and are not consulted
    pub fn to_scene(&self) -> Result<Scene, ImportError> {
        if self.version != FORMAT_VERSION {
            log::warn!(
                "Scene document version {} (expected {}), importing anyway",
                self.version,
                FORMAT_VERSION
            );
        }
        let elements = self
            .components
            .iter()
            .map(ComponentRecord::to_element)
            .collect::<Result<Vec<_>, _>>()?;
        let scene = Scene::from_elements(elements)?;
        log::info!("Imported scene with {} elements", scene.len());
        Ok(scene)
    }

    pub fn reading(&self, detector: ElementId) -> Option<&DetectorReading> {
        self.detector_readings
            .iter()
            .find(|r| r.detector_id == detector.0)
    }

    pub fn to_json_pretty(&self) -> Result<String, ImportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Parse a scene document straight into a scene
pub fn import(json: &str) -> Result<Scene, ImportError> {
    SceneDocument::from_json(json)?.to_scene()
}

/// Parse scene generator output, which may be wrapped in a Markdown code fence
pub fn parse_generated(text: &str) -> Result<SceneDocument, ImportError> {
    let body = strip_code_fence(text);
    let value: serde_json::Value = serde_json::from_str(body)?;
    if !value.get("components").is_some_and(|c| c.is_array()) {
        return Err(ImportError::MissingComponents);
    }
    Ok(serde_json::from_value(value)?)
}

/// Drop a leading ```` ```lang ```` line and a trailing ```` ``` ```` line
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    log::debug!("Stripping code fence from generated scene");
    let body = trimmed.split_once('\n').map_or("", |(_, rest)| rest);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Gating, Viewport, trace};

    const MICHELSON: &str = r#"{
      "version": "1.0",
      "timestamp": "2025-11-02T21:36:00.000Z",
      "components": [
        { "id": 1762100001001, "type": "laser", "position": { "x": 200, "y": 400 },
          "properties": { "wavelength": 650, "intensity": 1, "angle": 0 } },
        { "id": 1762100002002, "type": "beam_splitter", "position": { "x": 400, "y": 400 },
          "properties": { "reflectivity": 0.5, "angle": 45 } },
        { "id": 1762100003003, "type": "mirror", "position": { "x": 400, "y": 200 },
          "properties": { "reflectivity": 0.95, "angle": 0, "length": 100 } },
        { "id": 1762100004004, "type": "mirror", "position": { "x": 600, "y": 400 },
          "properties": { "reflectivity": 0.95, "angle": 90, "length": 100 } },
        { "id": 1762100005005, "type": "detector", "position": { "x": 400, "y": 600 },
          "properties": { "sensitivity": 1, "size": 50 } }
      ]
    }"#;

    #[test]
    fn test_import_generated_example() {
        let scene = import(MICHELSON).unwrap();
        assert_eq!(scene.len(), 5);
        assert_eq!(scene.sources().count(), 1);
        let detector = scene.get(ElementId(1762100005005)).unwrap();
        assert_eq!(
            detector.kind,
            ElementKind::Detector {
                sensitivity: 1.0,
                size: 50.0
            }
        );
    }

    #[test]
    fn test_missing_properties_use_defaults() {
        let json = r#"{ "version": "1.0", "components": [
            { "id": 1, "type": "concave_lens", "position": { "x": 0, "y": 0 },
              "properties": { "diameter": 120 } } ] }"#;
        let scene = import(json).unwrap();
        assert_eq!(
            scene.get(ElementId(1)).unwrap().kind,
            ElementKind::Lens {
                focal_length: -200.0,
                transparency: 0.95,
                angle: 0.0,
                diameter: 120.0
            }
        );
    }

    #[test]
    fn test_unknown_type_rejected() {
        let json = r#"{ "version": "1.0", "components": [
            { "id": 3, "type": "prism", "position": { "x": 0, "y": 0 } } ] }"#;
        assert!(matches!(
            import(json),
            Err(ImportError::UnknownType { id: 3, .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"{ "version": "1.0", "components": [
            { "id": 3, "type": "mirror", "position": { "x": 0, "y": 0 } },
            { "id": 3, "type": "detector", "position": { "x": 9, "y": 0 } } ] }"#;
        assert!(matches!(
            import(json),
            Err(ImportError::Scene(SceneError::DuplicateId(ElementId(3))))
        ));
    }

    #[test]
    fn test_export_round_trip_reproduces_trace() {
        let scene = import(MICHELSON).unwrap();
        let viewport = Viewport::default();
        let first = trace(&scene, viewport, &Gating::Disabled);

        let doc = SceneDocument::export(&scene, Some(&first));
        let json = doc.to_json_pretty().unwrap();
        let reimported = import(&json).unwrap();

        assert_eq!(reimported, scene);
        assert_eq!(trace(&reimported, viewport, &Gating::Disabled), first);
    }

    #[test]
    fn test_export_readings_and_type_names() {
        let scene = import(MICHELSON).unwrap();
        let result = trace(&scene, Viewport::default(), &Gating::Disabled);
        let doc = SceneDocument::export(&scene, Some(&result)).with_timestamp("now");

        assert_eq!(doc.version, FORMAT_VERSION);
        assert_eq!(doc.timestamp.as_deref(), Some("now"));
        assert_eq!(doc.components[0].component_type, "laser");
        assert_eq!(doc.detector_readings.len(), result.detector_hits.len());
        for (id, hit) in &result.detector_hits {
            assert_eq!(doc.reading(*id).unwrap().intensity, hit.intensity);
        }
    }

    #[test]
    fn test_export_json_uses_camel_case() {
        let lens = ComponentType::ConvexLens.instantiate(5, DVec2::new(1.0, 2.0));
        let scene = Scene::from_elements(vec![lens]).unwrap();
        let json = SceneDocument::export(&scene, None).to_json_pretty().unwrap();
        assert!(json.contains("\"focalLength\""));
        assert!(json.contains("\"detectorReadings\""));
        assert!(json.contains("\"type\": \"convex_lens\""));
        assert!(!json.contains("sensitivity"));
    }

    #[test]
    fn test_parse_generated_strips_fence() {
        let fenced = format!("```json\n{}\n```\n", MICHELSON);
        let doc = parse_generated(&fenced).unwrap();
        assert_eq!(doc.components.len(), 5);
        assert!(parse_generated(MICHELSON).is_ok());
    }

    #[test]
    fn test_parse_generated_requires_components() {
        let err = parse_generated(r#"{ "error": "No prompt provided" }"#);
        assert!(matches!(err, Err(ImportError::MissingComponents)));
        assert!(matches!(
            parse_generated("not json at all"),
            Err(ImportError::Json(_))
        ));
    }

    #[test]
    fn test_parse_generated_without_version() {
        let text = r#"{ "components": [
            { "id": 1, "type": "laser", "position": { "x": 0, "y": 0 }, "properties": {} } ] }"#;
        let doc = parse_generated(text).unwrap();
        assert_eq!(doc.version, FORMAT_VERSION);
        let scene = doc.to_scene().unwrap();
        assert_eq!(scene.sources().count(), 1);
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("  {}  "), "{}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}"), "{\"a\": 1}");
    }
}
