//! Flat-list menu: select an item, then let it handle its own settings.

use super::{is_exit, Menu, MenuCx, MenuFlags, Session};
use crate::keys::{Keypad, Keys};
use crate::panel::{Blink, BlinkMask, Buzzer, Display};
use crate::store::with_store;
use embassy_sync::blocking_mutex::raw::RawMutex;

/// What a [`ListItem`] is asked to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ListAction {
    /// Show sub-setting `sub`.
    Show,
    /// Encoder rotated while sub-setting `sub` is active.
    Rotate,
    /// ENTER pressed while sub-setting `sub` is active.
    Confirm,
}

/// One entry of a [`Menu::list`].
pub trait ListItem {
    /// Handle `action` on sub-setting `sub` (1-based) and return the next
    /// sub-setting. Returning 1 after [`ListAction::Confirm`] goes back to
    /// item selection.
    fn handle(&mut self, sub: u8, action: ListAction, cx: &mut MenuCx<'_>) -> u8;
}

impl<K: Keypad, D: Display, B: Buzzer, M: RawMutex> Menu<'_, K, D, B, M> {
    /// Run a flat-list menu session until BACK, END or a long ENTER.
    ///
    /// With `use_stop` the session waits without reconciling the low
    /// battery indicator and keeps its symbol off.
    pub async fn list(&mut self, items: &mut [&mut dyn ListItem], use_stop: bool) {
        if items.is_empty() {
            return;
        }
        let count = u8::try_from(items.len()).unwrap_or(u8::MAX);
        let mut session = Session::new(MenuFlags::NONE);
        session.blink = BlinkMask::CHARS;
        let mut sub = 0;

        self.clear_screen(use_stop);
        self.with_cx(&mut session, |cx| items[0].handle(1, ListAction::Show, cx));
        self.display.seg7_blink(Blink::Space);
        self.display.update();

        loop {
            let events = self.wait(use_stop).await;
            if is_exit(&events) {
                break;
            }
            let index = usize::from(session.id);

            if events.btn(Keys::ROT_ALL) {
                if sub != 0 {
                    self.with_cx(&mut session, |cx| {
                        items[index].handle(sub, ListAction::Rotate, cx)
                    });
                    self.display.chars_blink_mask(Blink::Space, session.blink);
                } else {
                    with_store(self.store, |s| s.clear_force());
                    session.step_id(count, !events.btn(Keys::ROT_L));
                    let index = usize::from(session.id);

                    self.clear_screen(use_stop);
                    session.blink = BlinkMask::CHARS;
                    self.with_cx(&mut session, |cx| items[index].handle(1, ListAction::Show, cx));
                    self.display.seg7_blink(Blink::Space);
                }
                self.display.update();
            } else if events.btn(Keys::ENTER) {
                self.buzzer.key_beep();
                if sub != 0 {
                    sub = self.with_cx(&mut session, |cx| {
                        items[index].handle(sub, ListAction::Confirm, cx)
                    });
                    if sub != 1 {
                        self.display.chars_blink_mask(Blink::Space, session.blink);
                    } else {
                        sub = 0;
                        self.display.seg7_blink(Blink::Space);
                        self.display.chars_blink(Blink::Off);
                    }
                    self.display.update();
                } else {
                    sub = 1;
                    self.display.seg7_blink(Blink::Off);
                    self.display.chars_blink_mask(Blink::Space, session.blink);
                }
            }
            session.editing = sub != 0;
        }

        if sub != 0 {
            let index = usize::from(session.id);
            self.with_cx(&mut session, |cx| {
                items[index].handle(sub, ListAction::Confirm, cx)
            });
        }
        self.finish(&mut session, use_stop);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::keys::KeyEvents;
    use crate::store::{ChannelStore, SharedStore};
    use crate::testing::{block_on, MockBuzzer, MockDisplay, MockKeypad};
    use core::cell::RefCell;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embassy_sync::blocking_mutex::Mutex;
    use std::vec;
    use std::vec::Vec;

    /// Item with two sub-settings; confirming the second one goes back.
    struct Counter {
        tag: u8,
        value: i16,
        calls: Vec<(u8, ListAction)>,
    }

    impl Counter {
        fn new(tag: u8) -> Self {
            Self {
                tag,
                value: 0,
                calls: Vec::new(),
            }
        }
    }

    impl ListItem for Counter {
        fn handle(&mut self, sub: u8, action: ListAction, cx: &mut MenuCx<'_>) -> u8 {
            self.calls.push((sub, action));
            match action {
                ListAction::Show => {
                    cx.display.seg7_number(self.tag);
                    sub
                }
                ListAction::Rotate => {
                    self.value = cx.change_val(self.value, -10, 10, 1, false);
                    cx.store.set_force(self.tag, self.value);
                    sub
                }
                ListAction::Confirm => {
                    if sub == 1 {
                        2
                    } else {
                        1
                    }
                }
            }
        }
    }

    fn run(items: &mut [&mut dyn ListItem], use_stop: bool, script: Vec<KeyEvents>) -> MockDisplay {
        let store: SharedStore<NoopRawMutex> = Mutex::new(RefCell::new(ChannelStore::default()));
        let mut menu = Menu::new(
            MockKeypad::new(script),
            MockDisplay::new(),
            MockBuzzer::default(),
            &store,
        );
        block_on(menu.list(items, use_stop));
        let force = with_store(&store, |s| s.force);
        assert_eq!(force, None);
        menu.into_parts().1
    }

    fn press(keys: Keys) -> KeyEvents {
        KeyEvents::pressed(keys)
    }

    #[test]
    fn test_rotation_selects_items_with_wrap() {
        let (mut a, mut b, mut c) = (Counter::new(1), Counter::new(2), Counter::new(3));
        let display = run(
            &mut [&mut a, &mut b, &mut c],
            false,
            vec![press(Keys::ROT_L), press(Keys::END)],
        );
        assert_eq!(display.seg7, Some(3));
        assert_eq!(a.calls, vec![(1, ListAction::Show)]);
        assert_eq!(c.calls, vec![(1, ListAction::Show)]);
        assert!(b.calls.is_empty());
    }

    #[test]
    fn test_item_owns_sub_navigation() {
        let (mut a, mut b) = (Counter::new(1), Counter::new(2));
        let script = vec![
            press(Keys::ROT_R),
            press(Keys::ENTER),
            press(Keys::ROT_R),
            press(Keys::ENTER),
            press(Keys::ROT_L),
            press(Keys::ENTER),
            press(Keys::ROT_R),
            press(Keys::END),
        ];
        let display = run(&mut [&mut a, &mut b], false, script);

        assert_eq!(
            b.calls,
            vec![
                (1, ListAction::Show),
                (1, ListAction::Rotate),
                (1, ListAction::Confirm),
                (2, ListAction::Rotate),
                (2, ListAction::Confirm),
            ]
        );
        assert_eq!(b.value, 0);
        // back in item selection, the last rotation moved to item 1
        assert_eq!(display.seg7, Some(1));
        assert_eq!(a.calls.len(), 2);
    }

    #[test]
    fn test_exit_while_active_confirms() {
        let mut a = Counter::new(1);
        let script = vec![press(Keys::ENTER), press(Keys::ROT_R), press(Keys::BACK)];
        let display = run(&mut [&mut a], true, script);

        assert_eq!(a.calls.last(), Some(&(1, ListAction::Confirm)));
        assert_eq!(display.seg7_blink, Blink::Off);
    }

    #[test]
    fn test_empty_list_returns() {
        let mut items: [&mut dyn ListItem; 0] = [];
        let display = run(&mut items, false, vec![]);
        assert_eq!(display.updates, 0);
    }
}
