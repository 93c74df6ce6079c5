//! Byte storage backing the `ArrayBuffer` built-in.
//!
//! A buffer is fixed-length when it has no maximum byte length and resizable otherwise.
//! Detaching drops the data block; it is one-way and afterwards the buffer reports a
//! length of zero.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::heap::HeapReservation;
use crate::runner::ds::object::{JsObject, JsObjectType, ObjectBase};

pub struct ArrayBufferObject {
    object_base: ObjectBase,
    /// `None` once the buffer has been detached.
    data: Option<Vec<u8>>,
    max_byte_length: Option<usize>,
    is_shared: bool,
    /// Heap bytes charged for `data`. Released when the buffer detaches or is dropped.
    reservation: Option<HeapReservation>,
}
/// CreateByteDataBlock. Fails with a RangeError instead of aborting when the block cannot
/// be allocated.
pub fn create_byte_data_block(byte_length: usize) -> Result<Vec<u8>, JErrorType> {
    let mut block = Vec::new();
    block
        .try_reserve_exact(byte_length)
        .map_err(|_| allocation_failed(byte_length))?;
    block.resize(byte_length, 0);
    Ok(block)
}

fn allocation_failed(byte_length: usize) -> JErrorType {
    JErrorType::RangeError(format!(
        "Array buffer allocation of {} bytes failed",
        byte_length
    ))
}

impl ArrayBufferObject {
    pub fn new(
        prototype: Option<JsObjectType>,
        byte_length: usize,
        max_byte_length: Option<usize>,
    ) -> Result<Self, JErrorType> {
        Ok(ArrayBufferObject {
            object_base: ObjectBase::with_prototype(prototype),
            data: Some(create_byte_data_block(byte_length)?),
            max_byte_length,
            is_shared: false,
            reservation: None,
        })
    }

    /// Ties the buffer to the heap bytes reserved for its data block.
    pub fn with_reservation(mut self, reservation: HeapReservation) -> Self {
        self.reservation = Some(reservation);
        self
    }

    /// Shared buffers only exist so receivers can be told apart; none of the
    /// `ArrayBuffer.prototype` operations accept them.
    pub fn new_shared(
        prototype: Option<JsObjectType>,
        byte_length: usize,
    ) -> Result<Self, JErrorType> {
        Ok(ArrayBufferObject {
            object_base: ObjectBase::with_prototype(prototype),
            data: Some(create_byte_data_block(byte_length)?),
            max_byte_length: None,
            is_shared: true,
            reservation: None,
        })
    }

    pub fn is_detached(&self) -> bool {
        self.data.is_none()
    }

    pub fn is_shared(&self) -> bool {
        self.is_shared
    }

    pub fn is_fixed_length(&self) -> bool {
        self.max_byte_length.is_none()
    }

    pub fn byte_length(&self) -> usize {
        self.data.as_ref().map_or(0, |d| d.len())
    }

    pub fn max_byte_length(&self) -> Option<usize> {
        self.max_byte_length
    }

    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    pub fn data_mut(&mut self) -> Option<&mut [u8]> {
        self.data.as_deref_mut()
    }

    /// Drops the data block, returning how many bytes it held.
    pub fn detach(&mut self) -> usize {
        self.reservation = None;
        self.data.take().map_or(0, |d| d.len())
    }

    /// Resizes a resizable buffer in place. Growth is zero-filled.
    pub fn resize(&mut self, new_byte_length: usize) -> Result<(), JErrorType> {
        let max = match self.max_byte_length {
            None => {
                return Err(JErrorType::TypeError(
                    "ArrayBuffer is not resizable".to_string(),
                ))
            }
            Some(max) => max,
        };
        if new_byte_length > max {
            return Err(JErrorType::RangeError(format!(
                "new length {} exceeds maxByteLength {}",
                new_byte_length, max
            )));
        }
        match self.data.as_mut() {
            None => Err(JErrorType::TypeError("ArrayBuffer is detached".to_string())),
            Some(data) => {
                let old_byte_length = data.len();
                if let Some(reservation) = self.reservation.as_mut() {
                    reservation.resize(new_byte_length)?;
                }
                if new_byte_length > old_byte_length {
                    if data.try_reserve_exact(new_byte_length - old_byte_length).is_err() {
                        if let Some(reservation) = self.reservation.as_mut() {
                            reservation.resize(old_byte_length)?;
                        }
                        return Err(allocation_failed(new_byte_length));
                    }
                }
                data.resize(new_byte_length, 0);
                Ok(())
            }
        }
    }
}
impl JsObject for ArrayBufferObject {
    fn get_object_base_mut(&mut self) -> &mut ObjectBase {
        &mut self.object_base
    }

    fn get_object_base(&self) -> &ObjectBase {
        &self.object_base
    }

    fn to_string(&self) -> String {
        format!("ArrayBuffer({})", self.byte_length())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::heap::{Heap, HeapConfig};

    #[test]
    fn test_detach_is_terminal() {
        let mut b = ArrayBufferObject::new(None, 4, Some(8)).unwrap();
        assert_eq!(b.detach(), 4);
        assert!(b.is_detached());
        assert_eq!(b.byte_length(), 0);
        assert_eq!(b.detach(), 0);
        assert!(b.resize(2).unwrap_err().is_type_error());
    }

    #[test]
    fn test_resize_zero_fills_and_truncates() {
        let mut b = ArrayBufferObject::new(None, 2, Some(4)).unwrap();
        b.data_mut().unwrap().copy_from_slice(&[7, 9]);
        b.resize(4).unwrap();
        assert_eq!(b.data().unwrap(), &[7, 9, 0, 0]);
        b.resize(1).unwrap();
        assert_eq!(b.data().unwrap(), &[7]);
        assert!(b.resize(5).unwrap_err().is_range_error());
    }

    #[test]
    fn test_fixed_length_buffer_rejects_resize() {
        let mut b = ArrayBufferObject::new(None, 2, None).unwrap();
        assert!(b.is_fixed_length());
        assert!(b.resize(2).unwrap_err().is_type_error());
    }

    #[test]
    fn test_reservation_follows_data_block() {
        let heap = Heap::new(HeapConfig::with_limit(8));
        let mut b = ArrayBufferObject::new(None, 4, Some(16))
            .unwrap()
            .with_reservation(heap.reserve(4).unwrap());
        b.resize(8).unwrap();
        assert_eq!(heap.get_allocated(), 8);
        assert!(b.resize(9).unwrap_err().is_range_error());
        assert_eq!(b.byte_length(), 8);
        b.resize(2).unwrap();
        assert_eq!(heap.get_allocated(), 2);
        b.detach();
        assert_eq!(heap.get_allocated(), 0);

        let b = ArrayBufferObject::new(None, 6, None)
            .unwrap()
            .with_reservation(heap.reserve(6).unwrap());
        assert_eq!(heap.get_allocated(), 6);
        drop(b);
        assert_eq!(heap.get_allocated(), 0);
    }
}
