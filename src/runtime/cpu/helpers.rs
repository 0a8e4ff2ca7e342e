//! Helpers shared by the CPU algorithm implementations

// ============================================================================
// Group Width Dispatch Macro
// ============================================================================

/// Macro for group-width dispatch to const-generic kernel calls
///
/// Matches a runtime lane count and executes the block with `$W` bound to
/// the same value as a `const usize`.
/// Usage: `dispatch_group_width!(width, W => { vector_spmm::<_, W>(...) })`
///
/// Widths outside the supported powers of two return `InvalidArgument`.
macro_rules! dispatch_group_width {
    ($width:expr, $W:ident => $body:block) => {
        match $width {
            1 => {
                const $W: usize = 1;
                $body
            }
            2 => {
                const $W: usize = 2;
                $body
            }
            4 => {
                const $W: usize = 4;
                $body
            }
            8 => {
                const $W: usize = 8;
                $body
            }
            16 => {
                const $W: usize = 16;
                $body
            }
            32 => {
                const $W: usize = 32;
                $body
            }
            64 => {
                const $W: usize = 64;
                $body
            }
            128 => {
                const $W: usize = 128;
                $body
            }
            256 => {
                const $W: usize = 256;
                $body
            }
            other => {
                return Err($crate::error::Error::invalid_argument(
                    "group_width",
                    format!("unsupported group width {}", other),
                ));
            }
        }
    };
}

pub(crate) use dispatch_group_width;
