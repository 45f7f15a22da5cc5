use std::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

//ticket counters: next ticket to hand out, ticket currently allowed in
struct Tickets{
    next: u64,
    serving: u64,
}

/// Mutual exclusion permit granted in strict arrival order.
///
/// Each caller of [`FairMutex::lock`] draws a ticket and sleeps until its
/// ticket is served, so a producer that locks in a tight loop cannot jump
/// ahead of one that queued earlier. Poisoning is ignored: the protected
/// value stays usable after a holder panics.
pub struct FairMutex<T>{
    tickets: Mutex<Tickets>,
    turn: Condvar,
    data: Mutex<T>,
}

pub struct FairMutexGuard<'a, T>{
    owner: &'a FairMutex<T>,
    data: MutexGuard<'a, T>,
}

impl<T> FairMutex<T>{
    pub fn new(value: T) -> Self{
        FairMutex{
            tickets: Mutex::new(Tickets{ next: 0, serving: 0 }),
            turn: Condvar::new(),
            data: Mutex::new(value),
        }
    }

    pub fn lock(&self) -> FairMutexGuard<'_, T>{
        let mut tickets = self.tickets.lock().unwrap_or_else(PoisonError::into_inner);
        let ticket = tickets.next;
        tickets.next = tickets.next.wrapping_add(1);

        while tickets.serving != ticket{
            tickets = self.turn.wait(tickets).unwrap_or_else(PoisonError::into_inner);
        }
        drop(tickets);

        //only the served ticket reaches here, so this never contends for long
        let data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        FairMutexGuard{ owner: self, data }
    }

    //holder plus waiters
    #[cfg(test)]
    fn queue_len(&self) -> u64{
        let tickets = self.tickets.lock().unwrap_or_else(PoisonError::into_inner);
        tickets.next.wrapping_sub(tickets.serving)
    }

    #[cfg(test)]
    fn into_inner(self) -> T{
        self.data.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self){
        let mut tickets = self.tickets.lock().unwrap_or_else(PoisonError::into_inner);
        tickets.serving = tickets.serving.wrapping_add(1);
        drop(tickets);
        self.turn.notify_all();
    }
}

impl<T: Default> Default for FairMutex<T>{
    fn default() -> Self{
        Self::new(T::default())
    }
}

impl<T> Deref for FairMutexGuard<'_, T>{
    type Target = T;

    fn deref(&self) -> &T{
        &self.data
    }
}

impl<T> DerefMut for FairMutexGuard<'_, T>{
    fn deref_mut(&mut self) -> &mut T{
        &mut self.data
    }
}

impl<T> Drop for FairMutexGuard<'_, T>{
    fn drop(&mut self){
        //the inner guard field drops right after this; the next ticket
        //holder waits on `data` for that instant
        self.owner.release();
    }
}
