use core::cell::RefCell;

use super::SdSpiBus;

impl<T> SdSpiBus for RefCell<T>
where
    T: SdSpiBus,
{
    type Error = T::Error;

    fn begin(&mut self) {
        let mut underlying = self.borrow_mut();
        underlying.begin()
    }

    fn init(&mut self, divisor: u8) {
        let mut underlying = self.borrow_mut();
        underlying.init(divisor)
    }

    fn receive(&mut self) -> u8 {
        let mut underlying = self.borrow_mut();
        underlying.receive()
    }

    fn receive_buffer(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error> {
        let mut underlying = self.borrow_mut();
        underlying.receive_buffer(buffer)
    }

    fn send(&mut self, byte: u8) {
        let mut underlying = self.borrow_mut();
        underlying.send(byte)
    }

    fn send_buffer(&mut self, buffer: &[u8]) {
        let mut underlying = self.borrow_mut();
        underlying.send_buffer(buffer)
    }

    fn uses_bus_locking(&self) -> bool {
        let underlying = self.borrow();
        underlying.uses_bus_locking()
    }
}
