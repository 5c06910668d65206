//! Fail-fast flag against reentrant cursors.

/// Marks a container as being enumerated by a removing cursor.
///
/// Cursors mutably borrow their container, so two live cursors cannot coexist. A cursor that was
/// leaked with [`std::mem::forget`] never clears the flag though, and the container then refuses
/// to hand out another cursor instead of resuming from a half-finished state.
#[derive(Debug, Default)]
pub(crate) struct CursorGuard {
    active: bool,
}

impl CursorGuard {
    #[inline(always)]
    pub fn enter(&mut self) {
        assert!(!self.active, "cursor cannot be used nested.");
        self.active = true;
    }

    #[inline(always)]
    pub fn exit(&mut self) {
        self.active = false;
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Clone for CursorGuard {
    fn clone(&self) -> Self {
        // a copy of a container is never being enumerated
        Self::default()
    }
}
