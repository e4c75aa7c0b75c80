/// Elementwise add: `c[i] = a[i] + b[i]` over three storage buffers.
pub const ADD_ARRAYS: &str = include_str!("shaders/add_arrays.wgsl");

/// Token in kernel source replaced by the workgroup size picked for the device.
pub const WORKGROUP_SIZE_PLACEHOLDER: &str = "WORKGROUP_SIZE";

/// Substitute the workgroup size into a kernel template.
pub fn instantiate(template: &str, workgroup_size: u32) -> String {
    template.replace(WORKGROUP_SIZE_PLACEHOLDER, &workgroup_size.to_string())
}
