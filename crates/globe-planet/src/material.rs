//! Planet surface material and the lighting helpers shared by the lit shaders.

use globe_render::LayerUniform;

/// WGSL helpers for Blinn-Phong lighting with a light fixed in view space.
/// `u_layer.params` carries (ambient, diffuse, specular, shininess).
pub(crate) const LIGHTING_WGSL: &str = r#"
const LIGHT_DIR_VIEW: vec3<f32> = vec3<f32>(-0.4, 0.5, 0.77);

fn view_normal(normal: vec3<f32>) -> vec3<f32> {
    return normalize((u_frame.view * u_frame.model * vec4<f32>(normal, 0.0)).xyz);
}

fn lit(albedo: vec3<f32>, n: vec3<f32>) -> vec3<f32> {
    let l = normalize(LIGHT_DIR_VIEW);
    let h = normalize(l + vec3<f32>(0.0, 0.0, 1.0));
    let diffuse = max(dot(n, l), 0.0);
    let specular = pow(max(dot(n, h), 0.0), u_layer.params.w);
    return albedo * (u_layer.params.x + u_layer.params.y * diffuse)
        + vec3<f32>(u_layer.params.z * specular);
}
"#;

/// Fixed Blinn-Phong coefficients for the planet body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanetMaterial {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
}

impl Default for PlanetMaterial {
    fn default() -> Self {
        Self {
            ambient: 0.2,
            diffuse: 0.8,
            specular: 0.3,
            shininess: 20.0,
        }
    }
}

impl PlanetMaterial {
    /// Pack into a layer uniform with an opaque white tint.
    pub fn to_uniform(self) -> LayerUniform {
        LayerUniform::new(
            [1.0; 4],
            [self.ambient, self.diffuse, self.specular, self.shininess],
        )
    }
}
