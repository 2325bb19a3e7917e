//! Scoped helpers that restore surface state on every exit path.

use std::ops::{Deref, DerefMut};

use crate::{Range, TextSurface};

/// Keeps an undo group open for its lifetime.
///
/// Everything done through the guard undoes as a single step, including
/// when the caller returns early.
pub struct UndoGroup<'a, S: TextSurface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: TextSurface + ?Sized> UndoGroup<'a, S> {
    pub fn new(surface: &'a mut S) -> Self {
        surface.begin_undo_group();
        Self { surface }
    }
}

impl<S: TextSurface + ?Sized> Drop for UndoGroup<'_, S> {
    fn drop(&mut self) {
        self.surface.end_undo_group();
    }
}

impl<S: TextSurface + ?Sized> Deref for UndoGroup<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: TextSurface + ?Sized> DerefMut for UndoGroup<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

/// Writes a saved property value back when dropped, unless committed.
pub struct Restore<'a, S: TextSurface + ?Sized, V> {
    surface: &'a mut S,
    saved: Option<V>,
    restore: fn(&mut S, V),
}

impl<'a, S: TextSurface + ?Sized, V> Restore<'a, S, V> {
    /// Capture the current value of a property.
    pub fn new(surface: &'a mut S, get: impl FnOnce(&S) -> V, restore: fn(&mut S, V)) -> Self {
        let saved = get(&*surface);
        Self::with_value(surface, saved, restore)
    }

    /// Restore to an explicit value rather than the current one.
    pub fn with_value(surface: &'a mut S, saved: V, restore: fn(&mut S, V)) -> Self {
        Self {
            surface,
            saved: Some(saved),
            restore,
        }
    }

    /// Value that will be written back.
    pub fn saved(&self) -> Option<&V> {
        self.saved.as_ref()
    }

    /// Keep the current state; nothing is restored.
    pub fn commit(mut self) {
        self.saved = None;
    }
}

impl<S: TextSurface + ?Sized, V> Drop for Restore<'_, S, V> {
    fn drop(&mut self) {
        if let Some(value) = self.saved.take() {
            (self.restore)(self.surface, value);
        }
    }
}

impl<S: TextSurface + ?Sized, V> Deref for Restore<'_, S, V> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: TextSurface + ?Sized, V> DerefMut for Restore<'_, S, V> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

/// Selection save/restore.
pub type SelectionGuard<'a, S> = Restore<'a, S, Range>;

fn restore_selection<S: TextSurface + ?Sized>(surface: &mut S, selection: Range) {
    surface.set_selection(selection.start, selection.end);
}

/// Guard that puts the current selection back on drop.
pub fn selection_guard<S: TextSurface + ?Sized>(surface: &mut S) -> SelectionGuard<'_, S> {
    Restore::new(surface, |s| s.selection(), restore_selection::<S>)
}

impl<'a, S: TextSurface + ?Sized> SelectionGuard<'a, S> {
    /// Guard that puts `selection` back on drop.
    pub fn with_selection(surface: &'a mut S, selection: Range) -> Self {
        Restore::with_value(surface, selection, restore_selection::<S>)
    }
}
