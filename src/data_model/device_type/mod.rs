use super::device::DeviceType;

pub mod root_node;

pub const DEVICE_TYPE_DOOR_LOCK: DeviceType = DeviceType {
    device_type: 0x000a,
    device_revision: 2,
};
