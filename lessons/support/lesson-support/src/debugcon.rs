//! QEMU debug console output.
//!
//! QEMU's `-debugcon` device captures every byte written to port `0x402`:
//!
//! ```bash
//! qemu-system-x86_64 ... -debugcon file:debug.log -global isa-debugcon.iobase=0x402
//! ```
//!
//! Without the `qemu` feature, or on targets without port I/O, the
//! [`qemu_trace!`](crate::qemu_trace) macro compiles to nothing.

#[cfg(all(feature = "qemu", target_arch = "x86_64"))]
#[doc(hidden)]
pub mod sink {
    use core::fmt::{self, Write};

    /// The port number for QEMU's debug port.
    const QEMU_DEBUG_PORT: u16 = 0x402;

    #[allow(clippy::inline_always)]
    #[inline(always)]
    fn putc(c: u8) {
        unsafe {
            core::arch::asm!(
                "out dx, al",
                in("dx") QEMU_DEBUG_PORT,
                in("al") c,
                options(nomem, nostack, preserves_flags)
            );
        }
    }

    pub struct DebugConsole;

    impl Write for DebugConsole {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            s.bytes().for_each(putc);
            Ok(())
        }
    }

    pub fn write(args: fmt::Arguments) {
        // Best effort, the port never fails.
        let _ = fmt::write(&mut DebugConsole, args);
    }
}

#[cfg(not(all(feature = "qemu", target_arch = "x86_64")))]
#[doc(hidden)]
pub mod sink {
    use core::fmt;

    #[inline]
    pub const fn write(_: fmt::Arguments) {}
}

/// Writes formatted text to the QEMU debug console.
#[macro_export]
macro_rules! qemu_trace {
    ($($arg:tt)*) => {{
        $crate::debugcon::sink::write(core::format_args!($($arg)*));
    }};
}
