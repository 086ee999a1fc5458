//! HTML bodies for the transactional emails. Kept as plain functions so the
//! outbox stores fully rendered messages.

pub struct EmailContent {
    pub subject: String,
    pub body: String,
}

pub fn welcome(name: &str) -> EmailContent {
    EmailContent {
        subject: "Welcome to Jobify!".to_string(),
        body: format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h2 style="color: #3b82f6;">Welcome to Jobify!</h2>
  <p>Hello {name},</p>
  <p>Thank you for joining Jobify! We're excited to have you on board.</p>
  <p>With Jobify, you can:</p>
  <ul>
    <li>Create and manage your professional profile</li>
    <li>Browse and apply for jobs that match your skills</li>
    <li>Track your applications and interviews</li>
  </ul>
  <p>If you have any questions, please don't hesitate to contact our support team.</p>
  <p>Best regards,<br>The Jobify Team</p>
</div>"#
        ),
    }
}

pub fn password_reset(name: &str, reset_url: &str) -> EmailContent {
    EmailContent {
        subject: "Password Reset Request".to_string(),
        body: format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h2 style="color: #3b82f6;">Reset Your Password</h2>
  <p>Hello {name},</p>
  <p>We received a request to reset your password. Click the button below to create a new password:</p>
  <div style="text-align: center; margin: 30px 0;">
    <a href="{reset_url}" style="background-color: #3b82f6; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px; font-weight: bold;">Reset Password</a>
  </div>
  <p>If you didn't request this change, you can ignore this email and your password will remain the same.</p>
  <p>This link is valid for 15 minutes.</p>
  <p>Best regards,<br>The Jobify Team</p>
</div>"#
        ),
    }
}

pub fn application_confirmation(name: &str, job_title: &str, company: &str) -> EmailContent {
    EmailContent {
        subject: format!("Application Received: {}", job_title),
        body: format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h2 style="color: #3b82f6;">Application Submitted!</h2>
  <p>Hello {name},</p>
  <p>Your application for <strong>{job_title}</strong> at <strong>{company}</strong> has been successfully submitted.</p>
  <p>You can track the status of your application in your Jobify dashboard.</p>
  <p>Best regards,<br>The Jobify Team</p>
</div>"#
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_email_embeds_the_link() {
        let content = password_reset("Ada", "http://localhost:5000/reset/abc123");
        assert!(content.body.contains("http://localhost:5000/reset/abc123"));
        assert!(content.body.contains("Ada"));
    }

    #[test]
    fn confirmation_subject_names_the_job() {
        let content = application_confirmation("Ada", "Backend Engineer", "Acme");
        assert_eq!(content.subject, "Application Received: Backend Engineer");
        assert!(content.body.contains("Acme"));
    }
}
