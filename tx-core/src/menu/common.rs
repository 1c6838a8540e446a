//! Two-tier menu: select an id, then edit its settings one by one.

use super::{is_exit, Menu, MenuCx, MenuFlags, Session};
use crate::keys::{Keypad, Keys};
use crate::panel::{Blink, BlinkMask, Buzzer, Display};
use crate::store::{with_store, ChannelStore};
use embassy_sync::blocking_mutex::raw::RawMutex;

/// A screen driven by [`Menu::common`].
///
/// The engine owns the selected id and the setting index `k`
/// (`cx.session.id`, `cx.session.k`); the item owns what they mean.
pub trait CommonItem {
    /// Number of selectable ids.
    fn ids(&self, store: &ChannelStore) -> u8;

    /// Number of settings of menu `id`.
    fn settings(&self, id: u8) -> u8;

    /// Show the current id and its values.
    fn show(&mut self, cx: &mut MenuCx<'_>);

    /// Encoder rotated while editing setting `cx.session.k`.
    fn setting_changed(&mut self, cx: &mut MenuCx<'_>);

    /// Session start.
    fn init(&mut self, cx: &mut MenuCx<'_>) {
        self.show(cx);
    }

    fn id_next(&mut self, cx: &mut MenuCx<'_>) {
        cx.session.step_id(self.ids(cx.store), true);
        self.id_changed(cx);
    }

    fn id_prev(&mut self, cx: &mut MenuCx<'_>) {
        cx.session.step_id(self.ids(cx.store), false);
        self.id_changed(cx);
    }

    /// Custom id change, used with [`MenuFlags::ID_CHANGE`].
    fn id_change(&mut self, cx: &mut MenuCx<'_>) {
        if cx.events.btn(Keys::ROT_L) {
            self.id_prev(cx);
        } else {
            self.id_next(cx);
        }
    }

    fn id_changed(&mut self, cx: &mut MenuCx<'_>) {
        self.show(cx);
    }

    /// Before handling keys, while `cx.session.adc_wakeup` is set.
    fn adc_pre(&mut self, _cx: &mut MenuCx<'_>) {}

    /// After handling keys, while `cx.session.adc_wakeup` is set.
    fn adc_post(&mut self, _cx: &mut MenuCx<'_>) {}

    /// Entered setting-edit at setting 1.
    fn edit_start(&mut self, _cx: &mut MenuCx<'_>) {}

    /// Moved on to setting `cx.session.k`.
    fn setting_next(&mut self, cx: &mut MenuCx<'_>) {
        self.show(cx);
    }

    /// Leaving setting-edit, either after the last setting or on exit.
    fn commit(&mut self, _cx: &mut MenuCx<'_>) {}
}

impl<K: Keypad, D: Display, B: Buzzer, M: RawMutex> Menu<'_, K, D, B, M> {
    /// Run a two-tier menu session until BACK, END or a long ENTER.
    ///
    /// ENTER moves from id-select into setting 1, then through the
    /// settings; ENTER on the last setting commits and returns to
    /// id-select. Exiting while editing commits too, so `commit` runs
    /// exactly once per visit to setting-edit.
    pub async fn common(&mut self, item: &mut dyn CommonItem, flags: MenuFlags) {
        let mut session = Session::new(flags);
        let plain = flags.contains(MenuFlags::STOP);
        let hide_low_power = flags.contains(MenuFlags::LOW_POWER);

        self.clear_screen(hide_low_power);
        self.with_cx(&mut session, |cx| item.init(cx));
        if session.editing {
            self.display.chars_blink_mask(Blink::Space, session.blink);
        } else if session.blink.contains(BlinkMask::SEG7) {
            self.display.seg7_blink(Blink::Space);
        }
        self.display.update();

        loop {
            let events = self.wait(plain).await;
            if is_exit(&events) {
                break;
            }

            if session.adc_wakeup {
                self.with_cx(&mut session, |cx| item.adc_pre(cx));
            }

            if events.btn(Keys::ROT_ALL) {
                if session.editing {
                    self.with_cx(&mut session, |cx| item.setting_changed(cx));
                    self.display.chars_blink_mask(Blink::Space, session.blink);
                } else {
                    session.adc_wakeup = false;
                    session.blink = BlinkMask::ALL;
                    with_store(self.store, |s| s.clear_force());
                    self.clear_screen(hide_low_power);

                    let custom = flags.contains(MenuFlags::ID_CHANGE);
                    self.with_cx(&mut session, |cx| {
                        if custom {
                            item.id_change(cx);
                        } else if cx.events.btn(Keys::ROT_L) {
                            item.id_prev(cx);
                        } else {
                            item.id_next(cx);
                        }
                    });
                    if session.blink.contains(BlinkMask::SEG7) {
                        self.display.seg7_blink(Blink::Space);
                    }
                }
                self.display.update();
            } else if events.btn(Keys::ENTER) {
                self.buzzer.key_beep();
                if session.editing {
                    if session.k < item.settings(session.id) {
                        session.k += 1;
                        self.with_cx(&mut session, |cx| item.setting_next(cx));
                        self.display.chars_blink_mask(Blink::Space, session.blink);
                    } else {
                        self.with_cx(&mut session, |cx| item.commit(cx));
                        session.k = 1;
                        session.editing = false;
                        if session.blink.contains(BlinkMask::SEG7) {
                            self.display.seg7_blink(Blink::Space);
                        }
                        self.display.chars_blink(Blink::Off);
                    }
                } else {
                    session.editing = true;
                    session.k = 1;
                    self.with_cx(&mut session, |cx| item.edit_start(cx));
                    self.display.seg7_blink(Blink::Off);
                    self.display.chars_blink_mask(Blink::Space, session.blink);
                }
                self.display.update();
            }

            if session.adc_wakeup {
                self.with_cx(&mut session, |cx| item.adc_post(cx));
            }
        }

        if session.editing {
            self.with_cx(&mut session, |cx| item.commit(cx));
        }
        self.finish(&mut session, hide_low_power);
    }
}
