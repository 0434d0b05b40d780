use core::arch::global_asm;

// The previous stage leaves the hand-off blob's address in x0; keep it
// there for rust_entry and pass the current exception level in x1.
// `__boot_stack_top` is provided by the linker script. The privilege
// switch and the vector table live in the platform start-up code, not
// here.
global_asm!(
    r#"
.section ".text.boot"
.global _start
_start:
    adrp    x2, __boot_stack_top
    add     x2, x2, :lo12:__boot_stack_top
    mov     sp, x2
    mrs     x1, CurrentEL
    lsr     x1, x1, #2
    bl      rust_entry
0:  wfe
    b       0b
"#
);
