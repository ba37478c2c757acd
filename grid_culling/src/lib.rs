/*!
# Grid Culling

Visibility determination for an `n x n` grid of instanced objects.

Every frame, a selectable strategy decides which cells get their real
geometry drawn. The strategies range from drawing everything to GPU
occlusion queries organised hierarchically over a quadtree, and they all
talk to the GPU through the abstract [`renderer::Renderer`] trait.

## Architecture

- **Frustum**: conservative AABB test against the six view planes
- **Quadtree**: complete 4-ary hierarchy over the grid, stored flat, carrying
  a per-node visibility cache from one frame to the next
- **QueryPool**: preallocated occlusion queries reused every traversal
- **Strategies**: Unculled, Frustum, Stop-and-Wait, Pipelined (PVS) and
  Coherent Hierarchical Culling (CHC)
- **Scene**: per-frame driver (camera, strategy selection, fallback, stats)

Backends implement `Renderer`; `MockRenderer` stands in for the GPU in tests.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod camera;
pub mod config;
pub mod renderer;
pub mod scene;
pub mod stats;

// Main culling namespace module
pub mod culling {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Backend trait
    pub use crate::renderer::Renderer;

    // Entry points
    pub use crate::config::{CullingConfig, StrategyKind};
    pub use crate::scene::{Scene, SceneObject};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, sources};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Render sub-module with the backend seam and the mock
    pub mod render {
        pub use crate::renderer::*;
    }

    // Scene sub-module (grid, quadtree, strategies)
    pub mod scene {
        pub use crate::scene::*;
    }

    // Statistics sub-module
    pub mod stats {
        pub use crate::stats::*;
    }
}

// Re-export math library at crate root
pub use glam;
