//! TOML scene files for the sandbox runner.
//!
//! ```toml
//! steps = 240
//! dt = 0.0166667
//!
//! [config]
//! max_climb_angle_deg = 50.0
//!
//! [body]
//! position = [0.0, 3.0, 0.0]
//! radius = 0.5
//! height = 2.0
//!
//! [input]
//! move_velocity = [2.0, 0.0, 0.0]
//!
//! [[statics]]
//! id = 1
//! shape = { type = "plane" }
//! ```

use std::path::{Path, PathBuf};

use collide_slide::{
    CapsuleShape, ColliderShapeDef, ConfigError, Layer, SlideConfig, SlideConfigFile, Vec3,
    WorldStaticDef, collision::Quat,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneFile {
    #[serde(default = "default_steps")]
    pub steps: u32,
    #[serde(default = "default_dt")]
    pub dt: f32,
    #[serde(default)]
    pub config: SlideConfigFile,
    pub body: BodyFile,
    #[serde(default)]
    pub input: InputFile,
    #[serde(default)]
    pub statics: Vec<StaticFile>,
}

fn default_steps() -> u32 {
    240
}

fn default_dt() -> f32 {
    1.0 / 60.0
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BodyFile {
    pub position: [f32; 3],
    pub radius: f32,
    pub height: f32,
    #[serde(default)]
    pub center: [f32; 3],
    #[serde(default)]
    pub layer: u8,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputFile {
    #[serde(default)]
    pub move_velocity: [f32; 3],
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticFile {
    pub id: u32,
    #[serde(default)]
    pub translation: [f32; 3],
    /// Euler angles (roll, pitch, yaw) in degrees.
    #[serde(default)]
    pub rotation_deg: [f32; 3],
    #[serde(default)]
    pub layer: u8,
    #[serde(default)]
    pub trigger: bool,
    pub shape: StaticShapeFile,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StaticShapeFile {
    Plane {
        #[serde(default)]
        offset_along_normal: f32,
    },
    Cuboid {
        half_extents: [f32; 3],
    },
    Sphere {
        radius: f32,
    },
    CapsuleY {
        radius: f32,
        half_height: f32,
    },
    CylinderY {
        radius: f32,
        half_height: f32,
    },
}

/// A loaded, validated scene.
pub struct Scene {
    pub steps: u32,
    pub dt: f32,
    pub config: SlideConfig,
    pub body_position: Vec3,
    pub body_shape: CapsuleShape,
    pub body_layer: Layer,
    pub move_velocity: Vec3,
    pub statics: Vec<WorldStaticDef>,
}

impl Scene {
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SceneError::Io(path.to_path_buf(), e))?;
        let file: SceneFile =
            toml::from_str(&content).map_err(|e| SceneError::Parse(path.to_path_buf(), e))?;
        Self::try_from(file)
    }
}

impl TryFrom<SceneFile> for Scene {
    type Error = SceneError;

    fn try_from(file: SceneFile) -> Result<Self, Self::Error> {
        if !(file.dt > 0.0) || !file.dt.is_finite() {
            return Err(SceneError::Invalid(format!("dt must be positive, got {}", file.dt)));
        }

        let config = SlideConfig::try_from(file.config)?;
        let body_shape = CapsuleShape::new(file.body.radius, file.body.height, vec3(file.body.center));
        config.validate_shape(&body_shape)?;

        let statics = file.statics.into_iter().map(StaticFile::into_def).collect();

        Ok(Self {
            steps: file.steps,
            dt: file.dt,
            config,
            body_position: vec3(file.body.position),
            body_shape,
            body_layer: Layer::new(file.body.layer),
            move_velocity: vec3(file.input.move_velocity),
            statics,
        })
    }
}

impl StaticFile {
    fn into_def(self) -> WorldStaticDef {
        let [roll, pitch, yaw] = self.rotation_deg.map(f32::to_radians);
        let shape = match self.shape {
            StaticShapeFile::Plane { offset_along_normal } => {
                ColliderShapeDef::Plane { offset_along_normal }
            }
            StaticShapeFile::Cuboid { half_extents } => ColliderShapeDef::Cuboid {
                half_extents: vec3(half_extents),
            },
            StaticShapeFile::Sphere { radius } => ColliderShapeDef::Sphere { radius },
            StaticShapeFile::CapsuleY { radius, half_height } => {
                ColliderShapeDef::CapsuleY { radius, half_height }
            }
            StaticShapeFile::CylinderY { radius, half_height } => {
                ColliderShapeDef::CylinderY { radius, half_height }
            }
        };

        let mut def = WorldStaticDef::new(
            self.id,
            vec3(self.translation),
            Quat::from_euler_angles(roll, pitch, yaw),
            shape,
        )
        .on_layer(Layer::new(self.layer));
        if self.trigger {
            def = def.trigger();
        }
        def
    }
}

#[inline]
fn vec3(v: [f32; 3]) -> Vec3 {
    Vec3::new(v[0], v[1], v[2])
}

#[derive(Debug)]
pub enum SceneError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Config(ConfigError),
    Invalid(String),
}

impl From<ConfigError> for SceneError {
    fn from(e: ConfigError) -> Self {
        SceneError::Config(e)
    }
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::Io(path, e) => write!(f, "Failed to read scene {}: {}", path.display(), e),
            SceneError::Parse(path, e) => {
                write!(f, "Failed to parse scene {}: {}", path.display(), e)
            }
            SceneError::Config(e) => write!(f, "Invalid scene config: {}", e),
            SceneError::Invalid(msg) => write!(f, "Invalid scene: {}", msg),
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneError::Io(_, e) => Some(e),
            SceneError::Parse(_, e) => Some(e),
            SceneError::Config(e) => Some(e),
            SceneError::Invalid(_) => None,
        }
    }
}
