pub mod feedback;
pub mod observation;

pub use feedback::{DetectionFeedback, FeedbackLabel, FeedbackOrigin};
pub use observation::{
    DeviceSecuritySnapshot, Message, MoneyAmount, PaymentIntent, PhoneCall, UserId,
};
