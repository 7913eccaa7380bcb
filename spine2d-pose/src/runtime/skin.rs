use super::Skeleton;
use crate::{Attachment, Error, Skin};
use std::sync::Arc;

impl Skeleton {
    /// The active skin, if any.
    pub fn skin(&self) -> Option<&Skin> {
        self.skin.and_then(|i| self.data().skins.get(i))
    }

    /// Activates a skin by name, or deactivates the current one with `None`.
    ///
    /// Switching from another skin swaps attachments with [`Skeleton::swap_skin`]. Switching
    /// from no skin attaches each slot's setup attachment if the new skin has it. Deactivating
    /// leaves slots untouched.
    pub fn set_skin(&mut self, name: Option<&str>) -> Result<(), Error> {
        let Some(name) = name else {
            self.skin = None;
            return Ok(());
        };
        let data = Arc::clone(self.data());
        let Some(new_index) = data.skin_index(name) else {
            return Err(Error::UnknownSkin {
                name: name.to_string(),
            });
        };
        let new_skin = &data.skins[new_index];

        match self.skin.and_then(|i| data.skins.get(i)) {
            Some(old_skin) => {
                log::debug!("swapping skin '{}' -> '{}'", old_skin.name(), new_skin.name());
                self.swap_skin(old_skin, new_skin);
            }
            None => {
                log::debug!("activating skin '{}'", new_skin.name());
                for (slot_index, slot_data) in data.slots.iter().enumerate() {
                    let Some(setup_name) = slot_data.attachment.as_deref() else {
                        continue;
                    };
                    let Some(attachment) = new_skin.attachment(slot_index, setup_name) else {
                        continue;
                    };
                    if let Some(slot) = self.slots.get_mut(slot_index) {
                        slot.set_attachment(Some(Arc::clone(attachment)));
                    }
                }
            }
        }

        self.skin = Some(new_index);
        Ok(())
    }

    /// For every entry of `old`, a slot still showing that exact attachment instance gets the
    /// attachment of the same name from `new`, or none if `new` lacks the name. Slots showing
    /// anything else are left alone.
    pub fn swap_skin(&mut self, old: &Skin, new: &Skin) {
        for (slot_index, name, attachment) in old.iter() {
            let Some(slot) = self.slots.get_mut(slot_index) else {
                continue;
            };
            let attached_from_old = slot
                .attachment()
                .is_some_and(|current| Arc::ptr_eq(current, attachment));
            if attached_from_old {
                slot.set_attachment(new.attachment(slot_index, name).cloned());
            }
        }
    }

    /// Looks an attachment up in the active skin, then in the default skin.
    pub fn attachment(&self, slot_index: usize, name: &str) -> Option<&Arc<Attachment>> {
        let data = self.data();
        if let Some(skin) = self.skin.and_then(|i| data.skins.get(i)) {
            if let Some(attachment) = skin.attachment(slot_index, name) {
                return Some(attachment);
            }
            if self.skin == data.default_skin {
                return None;
            }
        }
        data.default_skin()
            .and_then(|skin| skin.attachment(slot_index, name))
    }

    /// Shows the named attachment on the named slot, or clears the slot with `None`.
    pub fn set_attachment(&mut self, slot_name: &str, attachment_name: Option<&str>) -> Result<(), Error> {
        let Some(slot_index) = self.find_slot(slot_name) else {
            return Err(Error::UnknownSlot {
                name: slot_name.to_string(),
            });
        };
        let attachment = match attachment_name {
            None => None,
            Some(name) => match self.attachment(slot_index, name) {
                Some(attachment) => Some(Arc::clone(attachment)),
                None => {
                    return Err(Error::UnknownAttachment {
                        slot: slot_name.to_string(),
                        attachment: name.to_string(),
                    });
                }
            },
        };
        if let Some(slot) = self.slots.get_mut(slot_index) {
            slot.set_attachment(attachment);
        }
        Ok(())
    }
}
