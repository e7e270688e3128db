/// Common interface for mutex implementations.
///
/// [`Pin`][crate::Pin] handles share one expander, so the expander is wrapped in a mutex and each
/// pin operation locks it for the duration of one call.  `i2c-expander` implements this trait
/// for a few existing mutex types, some of them guarded by a feature:
///
/// | Mutex | Feature Name | Notes |
/// | --- | --- | --- |
/// | [`core::cell::RefCell`] | _always available_ | For sharing within a single execution context. |
/// | [`std::sync::Mutex`][mutex-std] | `std` | For platforms where `std` is available. |
/// | [`critical_section::Mutex`][mutex-cs] | `critical-section` | Use critical sections to ensure synchronized access. |
///
/// [mutex-std]: https://doc.rust-lang.org/std/sync/struct.Mutex.html
/// [mutex-cs]: https://docs.rs/critical-section/latest/critical_section/struct.Mutex.html
///
/// For other mutex types, a custom implementation is needed.  Due to the orphan rule, it might be
/// necessary to wrap it in a newtype:
///
/// ```
/// struct MyMutex<T>(std::sync::Mutex<T>);
///
/// impl<T> i2c_expander::PortMutex for MyMutex<T> {
///     type Port = T;
///
///     fn create(v: T) -> Self {
///         Self(std::sync::Mutex::new(v))
///     }
///
///     fn lock<R, F: FnOnce(&mut Self::Port) -> R>(&self, f: F) -> R {
///         let mut v = self.0.lock().unwrap();
///         f(&mut v)
///     }
/// }
/// ```
pub trait PortMutex {
    /// The expander that is wrapped inside this mutex.
    type Port;

    /// Create a new mutex of this type.
    fn create(v: Self::Port) -> Self;

    /// Lock the mutex and give a closure access to the expander inside.
    fn lock<R, F: FnOnce(&mut Self::Port) -> R>(&self, f: F) -> R;
}

impl<T> PortMutex for core::cell::RefCell<T> {
    type Port = T;

    fn create(v: Self::Port) -> Self {
        core::cell::RefCell::new(v)
    }

    fn lock<R, F: FnOnce(&mut Self::Port) -> R>(&self, f: F) -> R {
        let mut v = self.borrow_mut();
        f(&mut v)
    }
}

#[cfg(any(test, feature = "std"))]
impl<T> PortMutex for std::sync::Mutex<T> {
    type Port = T;

    fn create(v: Self::Port) -> Self {
        std::sync::Mutex::new(v)
    }

    fn lock<R, F: FnOnce(&mut Self::Port) -> R>(&self, f: F) -> R {
        let mut v = self.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut v)
    }
}

#[cfg(feature = "critical-section")]
impl<T> PortMutex for critical_section::Mutex<core::cell::RefCell<T>> {
    type Port = T;

    fn create(v: Self::Port) -> Self {
        critical_section::Mutex::new(core::cell::RefCell::new(v))
    }

    fn lock<R, F: FnOnce(&mut Self::Port) -> R>(&self, f: F) -> R {
        critical_section::with(|cs| {
            let mut v = self.borrow_ref_mut(cs);
            f(&mut v)
        })
    }
}

#[cfg(test)]
mod tests {
    use embedded_hal_mock::eh1::i2c as mock_i2c;

    use super::PortMutex;
    use crate::mock::MockHost;
    use crate::{LifecycleState, Pin, Tca95xx8Expander};

    #[test]
    fn std_mutex() {
        let expectations = [
            mock_i2c::Transaction::write(0x20, vec![0x03, 0xff]),
            mock_i2c::Transaction::write(0x20, vec![0x01, 0xff]),
            mock_i2c::Transaction::write(0x20, vec![0x03, 0x7f]),
            mock_i2c::Transaction::write(0x20, vec![0x01, 0x7f]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let port = std::sync::Mutex::create(Tca95xx8Expander::new(
            MockHost::new(&bus),
            18,
            19,
            0x20,
        ));
        PortMutex::lock(&port, |expander| expander.begin()).unwrap();

        let mut p7 = Pin::new_output(7, &port).unwrap();
        p7.set_low().unwrap();

        drop(p7);
        let expander = port.into_inner().unwrap();
        assert_eq!(expander.state(), LifecycleState::Begun);

        bus.done();
    }
}
