/// A typical code generation response: markdown chatter wrapping one
/// fenced Python script.
pub fn simulation_response_fixture() -> &'static str {
    return r#"
Here's a complete bouncing ball simulation.

```python
import pygame

pygame.init()
screen = pygame.display.set_mode((640, 480))
y, vy = 50.0, 0.0

running = True
while running:
    for event in pygame.event.get():
        if event.type == pygame.QUIT:
            running = False
    vy += 0.5
    y += vy
    if y > 460:
        y, vy = 460, -vy * 0.9
    screen.fill((0, 0, 0))
    pygame.draw.circle(screen, (200, 50, 50), (320, int(y)), 20)
    pygame.display.flip()

pygame.quit()
```

Run it and press the window close button to exit. Enjoy!
"#
    .trim();
}
