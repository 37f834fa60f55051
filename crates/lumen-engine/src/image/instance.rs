/// One placement of an image in window pixel space.
///
/// `z` feeds the projection's depth range only. Draw order is attach order.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Instance {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Instance {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// Index of an instance within its image.
///
/// Instance lists are append-only, so an id stays valid for the lifetime of
/// the image even when the backing storage grows.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct InstanceId(pub(crate) u32);

impl InstanceId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}
