use glam::Vec3;

/// Step from `from` toward `to` by at most `max_step`, landing exactly on
/// `to` when it is within reach.
#[must_use]
pub fn move_towards(from: Vec3, to: Vec3, max_step: f32) -> Vec3 {
    let delta = to - from;
    let dist = delta.length();
    if dist <= max_step || dist == 0.0 {
        return to;
    }
    from + delta / dist * max_step
}
