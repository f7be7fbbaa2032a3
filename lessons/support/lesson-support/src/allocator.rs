//! Global allocator on top of boot services pool memory.

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::{self, NonNull, null_mut};
use uefi::boot::{self, MemoryType};

/// Backs Rust's global allocator with `AllocatePool`.
///
/// Pool memory is only 8-byte aligned. Each block is over-allocated and the
/// pool pointer is stored right before the aligned address for `dealloc`.
pub struct PoolAllocator;

#[cfg(target_os = "uefi")]
#[global_allocator]
static GLOBAL_ALLOC: PoolAllocator = PoolAllocator;

unsafe impl GlobalAlloc for PoolAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let align = layout.align().max(size_of::<usize>());
        let size = layout.size().max(1);
        let Some(total) = size
            .checked_add(align)
            .and_then(|v| v.checked_add(size_of::<usize>()))
        else {
            return null_mut();
        };

        let Ok(raw) = boot::allocate_pool(MemoryType::LOADER_DATA, total) else {
            return null_mut();
        };

        let raw_ptr = raw.as_ptr();
        let addr = raw_ptr as usize + size_of::<usize>();
        let aligned = (addr + (align - 1)) & !(align - 1);
        let header_ptr = (aligned - size_of::<usize>()) as *mut usize;

        // SAFETY: the header slot lies inside the allocation.
        unsafe { ptr::write(header_ptr, raw_ptr as usize) };
        raw_ptr.wrapping_add(aligned - raw_ptr as usize)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        if ptr.is_null() {
            return;
        }

        let header_ptr = (ptr as usize - size_of::<usize>()) as *mut usize;
        let orig_ptr = unsafe { ptr::read(header_ptr) } as *mut u8;

        // SAFETY: `orig_ptr` was returned by `allocate_pool` in `alloc`.
        let _ = unsafe { boot::free_pool(NonNull::new_unchecked(orig_ptr)) };
    }
}
