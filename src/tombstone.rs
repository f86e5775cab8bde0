/// A stored value that can be logically removed without leaving the
/// structure holding it. Hidden values still act as keys.
#[derive(Debug)]
pub struct TombStone<T> {
    value: T,
    hidden: bool,
}

impl<T> TombStone<T> {
    pub fn new(value: T) -> Self {
        TombStone {
            value,
            hidden: false,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// The stored value regardless of visibility.
    pub fn key(&self) -> &T {
        &self.value
    }

    pub fn value(&self) -> Option<&T> {
        if self.hidden {
            None
        } else {
            Some(&self.value)
        }
    }

    pub fn bury(&mut self) {
        self.hidden = true;
    }

    /// Stores `value` visibly and hands back whatever was there before.
    pub fn revive(&mut self, value: T) -> T {
        self.hidden = false;
        std::mem::replace(&mut self.value, value)
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}
