//! Background asset loading with placeholder fallbacks.
//!
//! Every request runs on its own named thread and posts its result over a channel.
//! The frame loop drains finished loads with [`AssetLoader::try_recv`] and swaps them
//! into the scene. There is no retry, cancellation or timeout: a load that never
//! finishes simply leaves the placeholder in place.

use crate::error::AssetError;
use crate::material::ShaderSource;
use crate::mesh::MeshData;
use crate::vertex::Vertex;
use glam::Mat4;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

/// Fallback vertex shader used until (or instead of) the runtime source.
pub const FALLBACK_VERTEX_SHADER: &str = r#"
uniform mat4 modelMatrix;
uniform mat4 viewMatrix;
uniform mat4 projectionMatrix;
in vec3 position;
in vec2 uv;
out vec2 vUv;
void main() {
    vUv = uv;
    gl_Position = projectionMatrix * viewMatrix * modelMatrix * vec4(position, 1.0);
}
"#;

/// Fallback fragment shader: flat animated blue.
pub const FALLBACK_FRAGMENT_SHADER: &str = r#"
uniform float iGlobalTime;
uniform vec2 iResolution;
in vec2 vUv;
out vec4 fragColor;
void main() {
    float ripple = 0.05 * sin(vUv.x * 40.0 + iGlobalTime * 2.0);
    fragColor = vec4(0.1, 0.35 + ripple, 0.6 + ripple, 0.85);
}
"#;

/// What to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    /// A glTF/GLB model flattened into one mesh.
    Model(PathBuf),
    /// A vertex + fragment shader pair.
    Shaders { vertex: PathBuf, fragment: PathBuf },
}

/// A vertex + fragment shader pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderPair {
    pub vertex: ShaderSource,
    pub fragment: ShaderSource,
}

impl ShaderPair {
    /// The embedded pair used on failure.
    pub fn fallback() -> Self {
        Self {
            vertex: ShaderSource::Embedded(FALLBACK_VERTEX_SHADER),
            fragment: ShaderSource::Embedded(FALLBACK_FRAGMENT_SHADER),
        }
    }
}

/// A successfully loaded asset.
#[derive(Debug, Clone)]
pub enum LoadedAsset {
    Model(MeshData),
    Shaders(ShaderPair),
}

/// Completion message for one request, tagged with the caller's key.
#[derive(Debug)]
pub struct AssetEvent<K> {
    pub key: K,
    pub result: Result<LoadedAsset, AssetError>,
}

/// Spawns loads and collects their completions.
pub struct AssetLoader<K> {
    tx: Sender<AssetEvent<K>>,
    rx: Receiver<AssetEvent<K>>,
    pending: usize,
}

impl<K: Clone + Send + 'static> Default for AssetLoader<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Send + 'static> AssetLoader<K> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx, pending: 0 }
    }

    /// Start loading `source` in the background. The result arrives tagged with `key`.
    pub fn request(&mut self, key: K, source: AssetSource) {
        let tx = self.tx.clone();
        let thread_key = key.clone();
        let name = match &source {
            AssetSource::Model(path) => format!("asset-{}", file_label(path)),
            AssetSource::Shaders { fragment, .. } => format!("asset-{}", file_label(fragment)),
        };
        log::debug!("Requesting {:?}", source);

        let spawned = thread::Builder::new().name(name).spawn(move || {
            let result = load(&source);
            // The loader may have been dropped; nobody is waiting then.
            let _ = tx.send(AssetEvent {
                key: thread_key,
                result,
            });
        });

        self.pending += 1;
        if let Err(e) = spawned {
            log::error!("Failed to spawn asset loader thread: {}", e);
            let _ = self.tx.send(AssetEvent {
                key,
                result: Err(AssetError::Spawn(e)),
            });
        }
    }

    /// Next finished load, if any. Never blocks.
    pub fn try_recv(&mut self) -> Option<AssetEvent<K>> {
        let event = self.rx.try_recv().ok()?;
        self.pending = self.pending.saturating_sub(1);
        Some(event)
    }

    /// Loads requested but not yet drained.
    pub fn pending(&self) -> usize {
        self.pending
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string())
}

/// Load an asset synchronously.
pub fn load(source: &AssetSource) -> Result<LoadedAsset, AssetError> {
    match source {
        AssetSource::Model(path) => load_model(path).map(LoadedAsset::Model),
        AssetSource::Shaders { vertex, fragment } => Ok(LoadedAsset::Shaders(ShaderPair {
            vertex: load_shader_file(vertex)?,
            fragment: load_shader_file(fragment)?,
        })),
    }
}

/// Load a shader from the filesystem at runtime.
pub fn load_shader_file(path: impl AsRef<Path>) -> Result<ShaderSource, AssetError> {
    let path = path.as_ref();
    std::fs::read_to_string(path)
        .map(ShaderSource::Runtime)
        .map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Import a glTF/GLB file and flatten every mesh primitive of the default scene
/// (node transforms applied) into one mesh.
pub fn load_model(path: impl AsRef<Path>) -> Result<MeshData, AssetError> {
    let path = path.as_ref();
    let (document, buffers, _images) = gltf::import(path).map_err(|source| AssetError::Gltf {
        path: path.to_path_buf(),
        source,
    })?;

    let mut merged = MeshData::new();
    let scene = document.default_scene().or_else(|| document.scenes().next());
    match scene {
        Some(scene) => {
            for node in scene.nodes() {
                collect_node(&node, Mat4::IDENTITY, &buffers, &mut merged);
            }
        }
        None => {
            for mesh in document.meshes() {
                append_mesh(&mesh, Mat4::IDENTITY, &buffers, &mut merged);
            }
        }
    }

    if merged.is_empty() {
        return Err(AssetError::EmptyModel(path.to_path_buf()));
    }
    log::info!(
        "Loaded model {} ({} vertices, {} triangles)",
        path.display(),
        merged.vertices.len(),
        merged.triangle_count()
    );
    Ok(merged)
}

fn collect_node(node: &gltf::Node, parent: Mat4, buffers: &[gltf::buffer::Data], out: &mut MeshData) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        append_mesh(&mesh, world, buffers, out);
    }
    for child in node.children() {
        collect_node(&child, world, buffers, out);
    }
}

fn append_mesh(mesh: &gltf::Mesh, matrix: Mat4, buffers: &[gltf::buffer::Data], out: &mut MeshData) {
    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            continue;
        }
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        let Some(positions) = reader.read_positions() else {
            continue;
        };

        let mut part = MeshData::new();
        part.vertices = positions
            .map(|p| Vertex::new(p, [0.0, 0.0, 0.0], [0.0, 0.0]))
            .collect();
        part.indices = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..part.vertices.len() as u32).collect(),
        };
        match reader.read_normals() {
            Some(normals) => {
                for (vertex, normal) in part.vertices.iter_mut().zip(normals) {
                    vertex.normal = normal;
                }
            }
            None => part.compute_normals(),
        }
        if let Some(uvs) = reader.read_tex_coords(0) {
            for (vertex, uv) in part.vertices.iter_mut().zip(uvs.into_f32()) {
                vertex.tex_coords = uv;
            }
        }
        out.append_transformed(&part, matrix);
    }
}
