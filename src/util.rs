pub mod math {
    pub fn degree_to_radian(degree: f32) -> f32 {
        degree * std::f32::consts::PI / 180.0
    }

    /// tan(fov_y / 2), the half extent of the image plane at distance one.
    pub fn half_fov_tan(fov_y_degrees: f32) -> f32 {
        (degree_to_radian(fov_y_degrees) * 0.5).tan()
    }

}
